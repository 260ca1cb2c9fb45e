// src/noyau/transcendantes.rs
//
// Fonctions transcendantes à précision arbitraire
// -----------------------------------------------
// - π : Machin (entier scalé, troncature) ; e = exp(1)
// - exp : réduction x/2^k puis Taylor puis k carrés
// - ln : x = m·10^k, m = 2^j·r, r ∈ [0.75, 1.5] ; ln r = 2·atanh((r-1)/(r+1))
// - √ : Newton sur entier scalé
// - sin/cos : réduction modulo 2π puis Taylor ; tan = sin/cos
// - arctan : réduction x/(1+√(1+x²)) puis Taylor ; arcsin/arccos via arctan (demi-angle pour arccos)
// - sinh/cosh/tanh : Taylor près de 0, sinon via exp
//
// Chaque fonction calcule à `prec + GARDE` chiffres (plus ce que la réduction exige)
// puis arrondit à `prec`. Aucun cache : tout est recalculé à chaque appel.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use super::decimal::{nb_chiffres, pow10, Decimal, Precision};
use super::erreurs::EvalError;

/// Chiffres de garde.
const GARDE: u32 = 10;

/// Factorielle : argument maximal accepté.
pub const FACTORIELLE_MAX: i64 = 100_000;

/// Exposant entier maximal traité par carrés successifs (au-delà : exp(y·ln x)).
const EXPOSANT_ENTIER_MAX: i64 = 999_999_999;

/// Trig : exposant maximal de l’argument (la réduction modulo 2π coûte autant de chiffres de π).
const EXPOSANT_TRIG_MAX: i64 = 1_000;

/// exp : exposant maximal de l’argument (au-delà, le résultat sort de LIMITE_EXPOSANT).
const EXPOSANT_EXP_MAX: i64 = 11;

/* ------------------------ Fonctions nommées ------------------------ */

/// Fonctions unaires reconnues par l’évaluateur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Racine,
    Log,
    Ln,
    Exp,
}

impl Fonction {
    pub fn depuis_nom(nom: &str) -> Option<Self> {
        let f = match nom {
            "sin" => Fonction::Sin,
            "cos" => Fonction::Cos,
            "tan" => Fonction::Tan,
            "arcsin" => Fonction::Arcsin,
            "arccos" => Fonction::Arccos,
            "arctan" => Fonction::Arctan,
            "sinh" => Fonction::Sinh,
            "cosh" => Fonction::Cosh,
            "tanh" => Fonction::Tanh,
            "√" => Fonction::Racine,
            "log" => Fonction::Log,
            "ln" => Fonction::Ln,
            "exp" => Fonction::Exp,
            _ => return None,
        };
        Some(f)
    }

    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Arcsin => "arcsin",
            Fonction::Arccos => "arccos",
            Fonction::Arctan => "arctan",
            Fonction::Sinh => "sinh",
            Fonction::Cosh => "cosh",
            Fonction::Tanh => "tanh",
            Fonction::Racine => "√",
            Fonction::Log => "log",
            Fonction::Ln => "ln",
            Fonction::Exp => "exp",
        }
    }

    pub fn appliquer(self, x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
        match self {
            Fonction::Sin => sin(x, prec),
            Fonction::Cos => cos(x, prec),
            Fonction::Tan => tan(x, prec),
            Fonction::Arcsin => arcsin(x, prec),
            Fonction::Arccos => arccos(x, prec),
            Fonction::Arctan => arctan(x, prec),
            Fonction::Sinh => sinh(x, prec),
            Fonction::Cosh => cosh(x, prec),
            Fonction::Tanh => tanh(x, prec),
            Fonction::Racine => racine(x, prec),
            Fonction::Log => log10(x, prec),
            Fonction::Ln => ln(x, prec),
            Fonction::Exp => exp(x, prec),
        }
    }
}

/* ------------------------ Outils ------------------------ */

fn hors_domaine(fonction: &'static str, x: &Decimal) -> EvalError {
    EvalError::DomainError {
        fonction,
        valeur: x.to_string(),
    }
}

/// Arrondi final + zéros de queue retirés (√4 -> 2, pas 2.000…).
fn finir(v: Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    v.arrondir(prec).sans_zeros_jusqua(0).verifier()
}

/// Terme de série négligeable devant la somme courante.
fn negligeable(terme: &Decimal, somme: &Decimal, travail: Precision) -> bool {
    terme.est_zero()
        || (!somme.est_zero()
            && terme.exposant() < somme.exposant() - travail.chiffres() as i64 - 1)
}

fn chiffres_de(n: i64) -> u32 {
    nb_chiffres(&BigInt::from(n)) as u32
}

fn entier(n: i64) -> Decimal {
    Decimal::from(n)
}

/// 1/2, 1/10, 3/2 …
fn fraction(n: i64, echelle: i64) -> Decimal {
    Decimal::depuis_parts(n, echelle)
}

/* ------------------------ π (Machin) ------------------------ */

/// arctan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: u32, scale: &BigInt) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: u64 = 0;
    let mut q_pow = q;
    let mut sum = BigInt::zero();

    loop {
        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }

        if k % 2 == 0 {
            sum += &term;
        } else {
            sum -= &term;
        }

        q_pow *= &q2;
        k += 1;
    }

    sum
}

/// π à `prec` chiffres significatifs.
pub fn pi(prec: Precision) -> Decimal {
    let decimales = prec.chiffres() as u64 + GARDE as u64;
    let scale = pow10(decimales);

    // Machin : π = 16*atan(1/5) - 4*atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);
    let pi = BigInt::from(16) * a - BigInt::from(4) * b;

    Decimal::depuis_parts(pi, decimales as i64).arrondir(prec)
}

/// e à `prec` chiffres significatifs.
pub fn e(prec: Precision) -> Result<Decimal, EvalError> {
    exp(&Decimal::un(), prec)
}

/* ------------------------ exp / ln / log ------------------------ */

pub fn exp(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::un());
    }
    if x.exposant() > EXPOSANT_EXP_MAX {
        return Err(EvalError::Overflow);
    }

    // |x| grand : 2^k amplifie l’erreur relative, |x| aussi
    let e = x.exposant().max(0) as u32;
    let travail = prec.etendue(GARDE + 2 * e + 4);

    let demi = fraction(5, 1);
    let deux = entier(2);
    let mut r = x.abs();
    let mut k: u32 = 0;
    while r > demi {
        r = r.diviser(&deux, travail)?;
        k += 1;
    }

    let mut somme = Decimal::un();
    let mut terme = Decimal::un();
    let mut n: i64 = 1;
    loop {
        terme = terme.multiplier(&r, travail)?.diviser(&entier(n), travail)?;
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail)?;
        n += 1;
    }

    for _ in 0..k {
        somme = somme.multiplier(&somme, travail)?;
    }

    if x.est_negatif() {
        somme = Decimal::un().diviser(&somme, travail)?;
    }

    finir(somme, prec)
}

/// 2·atanh((r-1)/(r+1)) = ln r ; converge vite pour r proche de 1.
fn ln_serie(r: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    let un = Decimal::un();
    let z = r
        .soustraire(&un, travail)?
        .diviser(&r.additionner(&un, travail)?, travail)?;
    if z.est_zero() {
        return Ok(Decimal::zero());
    }

    let z2 = z.multiplier(&z, travail)?;
    let mut puissance = z.clone();
    let mut somme = z;
    let mut n: i64 = 1;
    loop {
        puissance = puissance.multiplier(&z2, travail)?;
        let terme = puissance.diviser(&entier(2 * n + 1), travail)?;
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail)?;
        n += 1;
    }

    somme.multiplier(&entier(2), travail)
}

fn ln2(travail: Precision) -> Result<Decimal, EvalError> {
    ln_serie(&entier(2), travail)
}

/// ln 10 = 3·ln 2 + ln(5/4)
fn ln10(travail: Precision) -> Result<Decimal, EvalError> {
    let trois_ln2 = ln2(travail)?.multiplier(&entier(3), travail)?;
    trois_ln2.additionner(&ln_serie(&fraction(125, 2), travail)?, travail)
}

/// ln de x > 0, à la précision `travail` (sans arrondi final).
fn ln_positif(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    if *x == Decimal::un() {
        return Ok(Decimal::zero());
    }

    // près de 1 : série directe (pas de cancellation)
    if *x > demi() && *x < fraction(15, 1) {
        return ln_serie(x, travail);
    }

    // x = m·10^k, m ∈ [1, 10)
    let k = x.exposant();
    let travail = travail.etendue(chiffres_de(k));
    let mut m = x.decaler(-k);

    // m = 2^j·r, r ∈ (0.75, 1.5]
    let un_et_demi = fraction(15, 1);
    let deux = entier(2);
    let mut j: i64 = 0;
    while m > un_et_demi {
        m = m.diviser(&deux, travail)?;
        j += 1;
    }

    let mut res = ln_serie(&m, travail)?;
    if j != 0 {
        res = res.additionner(&ln2(travail)?.multiplier(&entier(j), travail)?, travail)?;
    }
    if k != 0 {
        res = res.additionner(&ln10(travail)?.multiplier(&entier(k), travail)?, travail)?;
    }
    Ok(res)
}

fn demi() -> Decimal {
    fraction(5, 1)
}

pub fn ln(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.signe() <= 0 {
        return Err(hors_domaine("ln", x));
    }
    finir(ln_positif(x, prec.etendue(GARDE))?, prec)
}

/// Logarithme décimal.
pub fn log10(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.signe() <= 0 {
        return Err(hors_domaine("log", x));
    }
    let travail = prec.etendue(GARDE);
    let num = ln_positif(x, travail)?;
    finir(num.diviser(&ln10(travail)?, travail)?, prec)
}

/* ------------------------ √ ------------------------ */

/// floor(√n) par Newton (départ au-dessus de la racine, décroissance monotone).
fn racine_entiere(n: &BigInt) -> BigInt {
    if n.is_zero() {
        return BigInt::zero();
    }

    let mut y = BigInt::one() << ((n.bits() + 1) / 2);
    loop {
        let y_next = (&y + n / &y) >> 1;
        if y_next >= y {
            break;
        }
        y = y_next;
    }

    // ajustement final (floor)
    while &y * &y > *n {
        y -= 1u32;
    }
    while (&y + 1u32) * (&y + 1u32) <= *n {
        y += 1u32;
    }
    y
}

pub fn racine(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_negatif() {
        return Err(hors_domaine("√", x));
    }
    if x.est_zero() {
        return Ok(Decimal::zero());
    }

    // On veut N = mantisse·10^t avec (echelle + t) pair et au moins 2·w chiffres
    let w = (prec.chiffres() + GARDE) as i64;
    let d = nb_chiffres(x.mantisse()) as i64;
    let mut t = (2 * w - d).max(0);
    if (x.echelle() + t).rem_euclid(2) != 0 {
        t += 1;
    }

    let n = x.mantisse() * pow10(t as u64);
    let r = racine_entiere(&n);
    finir(Decimal::depuis_parts(r, (x.echelle() + t) / 2), prec)
}

/* ------------------------ Trigonométrie ------------------------ */

fn travail_trig(x: &Decimal, prec: Precision) -> Result<Precision, EvalError> {
    let e = x.exposant();
    if e > EXPOSANT_TRIG_MAX {
        return Err(EvalError::Overflow);
    }
    Ok(prec.etendue(GARDE + (e + 1).max(0) as u32))
}

/// r = x - 2π·round(x / 2π), r ∈ [-π, π]
fn reduire_angle(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    let deux_pi = pi(travail).multiplier(&entier(2), travail)?;
    let q = x.diviser(&deux_pi, travail)?.entier_proche();
    if q.is_zero() {
        return Ok(x.clone());
    }
    x.soustraire(&Decimal::entier(q).multiplier(&deux_pi, travail)?, travail)
}

fn sin_serie(r: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    if r.est_zero() {
        return Ok(Decimal::zero());
    }
    let r2 = r.multiplier(r, travail)?;
    let mut terme = r.clone();
    let mut somme = r.clone();
    let mut n: i64 = 1;
    loop {
        terme = terme
            .multiplier(&r2, travail)?
            .diviser(&entier((2 * n) * (2 * n + 1)), travail)?
            .neg();
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail)?;
        n += 1;
    }
    Ok(somme)
}

fn cos_serie(r: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    let r2 = r.multiplier(r, travail)?;
    let mut terme = Decimal::un();
    let mut somme = Decimal::un();
    let mut n: i64 = 1;
    loop {
        terme = terme
            .multiplier(&r2, travail)?
            .diviser(&entier((2 * n - 1) * (2 * n)), travail)?
            .neg();
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail)?;
        n += 1;
    }
    Ok(somme)
}

pub fn sin(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::zero());
    }
    let travail = travail_trig(x, prec)?;
    let r = reduire_angle(x, travail)?;
    finir(sin_serie(&r, travail)?, prec)
}

pub fn cos(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::un());
    }
    let travail = travail_trig(x, prec)?;
    let r = reduire_angle(x, travail)?;
    finir(cos_serie(&r, travail)?, prec)
}

pub fn tan(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::zero());
    }
    let travail = travail_trig(x, prec)?;
    let r = reduire_angle(x, travail)?;
    let s = sin_serie(&r, travail)?;
    let c = cos_serie(&r, travail)?;
    finir(s.diviser(&c, travail)?, prec)
}

/// arctan à la précision `travail` (sans arrondi final).
fn arctan_travail(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::zero());
    }

    let un = Decimal::un();
    let mut a = x.abs();
    let inverse = a > un;
    if inverse {
        a = un.diviser(&a, travail)?;
    }

    // atan(a) = 2·atan(a / (1 + √(1 + a²)))
    let dixieme = fraction(1, 1);
    let mut doublements: u32 = 0;
    while a > dixieme {
        let carre = a.multiplier(&a, travail)?;
        let rac = racine(&un.additionner(&carre, travail)?, travail)?;
        a = a.diviser(&un.additionner(&rac, travail)?, travail)?;
        doublements += 1;
    }

    let a2 = a.multiplier(&a, travail)?;
    let mut puissance = a.clone();
    let mut somme = a;
    let mut n: i64 = 1;
    loop {
        puissance = puissance.multiplier(&a2, travail)?.neg();
        let terme = puissance.diviser(&entier(2 * n + 1), travail)?;
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail)?;
        n += 1;
    }

    let mut res = somme.multiplier(&entier(1i64 << doublements), travail)?;
    if inverse {
        let demi_pi = pi(travail).diviser(&entier(2), travail)?;
        res = demi_pi.soustraire(&res, travail)?;
    }
    if x.est_negatif() {
        res = res.neg();
    }
    Ok(res)
}

pub fn arctan(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    finir(arctan_travail(x, prec.etendue(GARDE))?, prec)
}

/// arcsin à la précision `travail`, domaine déjà vérifié (|x| ≤ 1).
fn arcsin_travail(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    let un = Decimal::un();
    if x.abs() == un {
        let demi_pi = pi(travail).diviser(&entier(2), travail)?;
        return Ok(if x.est_negatif() { demi_pi.neg() } else { demi_pi });
    }
    let carre = x.multiplier(x, travail)?;
    let c = racine(&un.soustraire(&carre, travail)?, travail)?;
    arctan_travail(&x.diviser(&c, travail)?, travail)
}

pub fn arcsin(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.abs() > Decimal::un() {
        return Err(hors_domaine("arcsin", x));
    }
    finir(arcsin_travail(x, prec.etendue(GARDE))?, prec)
}

/// arccos(x) = 2·arctan(√((1-x)/(1+x))) : pas de soustraction à π/2 près de x = 1.
pub fn arccos(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    let un = Decimal::un();
    if x.abs() > un {
        return Err(hors_domaine("arccos", x));
    }
    if *x == un {
        return Ok(Decimal::zero());
    }
    if *x == un.neg() {
        return finir(pi(prec.etendue(GARDE)), prec);
    }

    let travail = prec.etendue(GARDE);
    let q = un
        .soustraire(x, travail)?
        .diviser(&un.additionner(x, travail)?, travail)?;
    let moitie = arctan_travail(&racine(&q, travail)?, travail)?;
    finir(moitie.multiplier(&entier(2), travail)?, prec)
}

/* ------------------------ Hyperboliques ------------------------ */

/// x + x³/3! + x⁵/5! + … (|x| < 1 : évite e^x - e^-x)
fn sinh_serie(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    let x2 = x.multiplier(x, travail)?;
    let mut terme = x.clone();
    let mut somme = x.clone();
    let mut n: i64 = 1;
    loop {
        terme = terme
            .multiplier(&x2, travail)?
            .diviser(&entier((2 * n) * (2 * n + 1)), travail)?;
        if negligeable(&terme, &somme, travail) {
            break;
        }
        somme = somme.additionner(&terme, travail)?;
        n += 1;
    }
    Ok(somme)
}

/// (e^x, e^-x) à la précision `travail`.
fn exp_pm(x: &Decimal, travail: Precision) -> Result<(Decimal, Decimal), EvalError> {
    let ep = exp(x, travail)?;
    let em = Decimal::un().diviser(&ep, travail)?;
    Ok((ep, em))
}

fn sinh_travail(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    if x.abs() < Decimal::un() {
        return sinh_serie(x, travail);
    }
    let (ep, em) = exp_pm(x, travail)?;
    ep.soustraire(&em, travail)?.diviser(&entier(2), travail)
}

fn cosh_travail(x: &Decimal, travail: Precision) -> Result<Decimal, EvalError> {
    let (ep, em) = exp_pm(x, travail)?;
    ep.additionner(&em, travail)?.diviser(&entier(2), travail)
}

pub fn sinh(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::zero());
    }
    finir(sinh_travail(x, prec.etendue(GARDE))?, prec)
}

pub fn cosh(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::un());
    }
    finir(cosh_travail(x, prec.etendue(GARDE))?, prec)
}

pub fn tanh(x: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if x.est_zero() {
        return Ok(Decimal::zero());
    }
    let travail = prec.etendue(GARDE);

    // |x| > w : e^-2|x| < 10^-w, tanh(x) = ±1 à la précision demandée
    if x.abs() > entier(travail.chiffres() as i64) {
        return Ok(if x.est_negatif() {
            Decimal::un().neg()
        } else {
            Decimal::un()
        });
    }

    let s = sinh_travail(x, travail)?;
    let c = cosh_travail(x, travail)?;
    finir(s.diviser(&c, travail)?, prec)
}

/* ------------------------ Puissance / factorielle ------------------------ */

/// x^n par carrés successifs (n entier, |n| ≤ EXPOSANT_ENTIER_MAX).
fn puissance_entiere(x: &Decimal, n: i64, prec: Precision) -> Result<Decimal, EvalError> {
    if n == 0 {
        return Ok(Decimal::un());
    }
    if x.est_zero() {
        return if n < 0 {
            Err(EvalError::DivisionByZero)
        } else {
            Ok(Decimal::zero())
        };
    }

    let travail = prec.etendue(GARDE + chiffres_de(n));
    let mut e = n.unsigned_abs();
    let mut acc = Decimal::un();
    let mut b = x.clone();

    while e > 0 {
        if (e & 1) == 1 {
            acc = acc.multiplier(&b, travail)?;
        }
        e >>= 1;
        if e > 0 {
            b = b.multiplier(&b, travail)?;
        }
    }

    if n < 0 {
        return Decimal::un().diviser(&acc, prec);
    }
    acc.arrondir(prec).verifier()
}

/// Parité d’un entier décimal (5, 5.00, 1E+3).
fn est_impair(y: &Decimal) -> bool {
    if y.echelle() < 0 {
        return false;
    }
    let n = y.mantisse() / pow10(y.echelle() as u64);
    !(n % 2u32).is_zero()
}

/// x^y : exposant entier -> carrés successifs ; sinon exp(y·ln |x|).
/// Base négative : seulement pour y entier, signe selon la parité de y.
pub fn puissance(x: &Decimal, y: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
    if let Some(n) = y.vers_i64().filter(|n| n.abs() <= EXPOSANT_ENTIER_MAX) {
        return puissance_entiere(x, n, prec);
    }

    if x.est_zero() {
        return if y.est_negatif() {
            Err(EvalError::DivisionByZero)
        } else {
            Ok(Decimal::zero())
        };
    }
    if x.est_negatif() && !y.est_entier() {
        return Err(hors_domaine("^", x));
    }

    let extra = y.exposant().clamp(0, EXPOSANT_EXP_MAX + 1) as u32;
    let travail = prec.etendue(GARDE + extra + 3);
    let produit = y.multiplier(&ln_positif(&x.abs(), travail)?, travail)?;
    let r = exp(&produit, prec)?;
    if x.est_negatif() && est_impair(y) {
        Ok(r.neg())
    } else {
        Ok(r)
    }
}

/// n! arrondi à `prec` (exact tant que la précision de travail suffit).
pub fn factorielle(n: u64, prec: Precision) -> Result<Decimal, EvalError> {
    let travail = prec.etendue(GARDE + chiffres_de(n as i64));
    let mut acc = Decimal::un();
    for i in 2..=n {
        acc = acc.multiplier(&Decimal::entier(i), travail)?;
    }
    acc.arrondir(prec).verifier()
}
