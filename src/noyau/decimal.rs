// src/noyau/decimal.rs
//
// Décimal à précision arbitraire
// ------------------------------
// - valeur = mantisse × 10^(-echelle), mantisse BigInt (signée)
// - Precision : nombre de chiffres significatifs conservés par chaque opération
// - Arrondi unique : HALF_UP (la demie s’éloigne de zéro)
// - Littéraux exacts jusqu’au premier arrondi
//
// Affichage : notation “canonique” (plain si échelle ≥ 0 et exposant ajusté ≥ -6, sinon d.dddE±n).

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::erreurs::EvalError;

/// Garde-fou : exposant décimal maximal (en valeur absolue) d’un résultat.
pub const LIMITE_EXPOSANT: i64 = 1_000_000_000_000;

/// Exposant maximal accepté dans un littéral (ex: 1E999999999).
const LIMITE_EXPOSANT_LITTERAL: i64 = 999_999_999;

/* ------------------------ Précision ------------------------ */

/// Contexte de précision : chiffres significatifs (≥ 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Precision {
    chiffres: u32,
}

impl Precision {
    /// `None` si `chiffres == 0`.
    pub fn new(chiffres: u32) -> Option<Self> {
        if chiffres == 0 {
            None
        } else {
            Some(Self { chiffres })
        }
    }

    pub fn chiffres(self) -> u32 {
        self.chiffres
    }

    /// Précision de travail : `extra` chiffres de garde en plus.
    pub fn etendue(self, extra: u32) -> Self {
        Self {
            chiffres: self.chiffres.saturating_add(extra),
        }
    }
}

/* ------------------------ Helpers BigInt ------------------------ */

pub(crate) fn pow10(n: u64) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// log10(2) arrondi par défaut : l’estimation ci-dessous ne dépasse jamais.
const LOG10_2_DEFAUT: f64 = 0.301_029_995_663;

/// Nombre de chiffres décimaux de |m| (0 compte pour 1).
///
/// 2^(bits-1) ≤ |m| : estimation par défaut depuis `bits()`, corrigée par
/// comparaison à 10^d (au plus une en pratique).
pub(crate) fn nb_chiffres(m: &BigInt) -> u64 {
    let bits = m.bits();
    if bits == 0 {
        return 1;
    }

    let mut d = ((bits - 1) as f64 * LOG10_2_DEFAUT) as u64 + 1;
    while m.magnitude() >= pow10(d).magnitude() {
        d += 1;
    }
    d
}

/* ------------------------ Decimal ------------------------ */

#[derive(Clone, Debug)]
pub struct Decimal {
    mantisse: BigInt,
    echelle: i64,
}

impl Decimal {
    pub fn zero() -> Self {
        Self {
            mantisse: BigInt::zero(),
            echelle: 0,
        }
    }

    pub fn un() -> Self {
        Self::entier(1)
    }

    pub fn entier(n: impl Into<BigInt>) -> Self {
        Self {
            mantisse: n.into(),
            echelle: 0,
        }
    }

    /// mantisse × 10^(-echelle)
    pub fn depuis_parts(mantisse: impl Into<BigInt>, echelle: i64) -> Self {
        Self {
            mantisse: mantisse.into(),
            echelle,
        }
    }

    pub fn mantisse(&self) -> &BigInt {
        &self.mantisse
    }

    pub fn echelle(&self) -> i64 {
        self.echelle
    }

    /// Lit un littéral décimal : [signe] chiffres [. chiffres] [(E|e) [signe] chiffres].
    /// Au moins un chiffre dans la partie significative. `None` si mal formé.
    pub fn lire(texte: &str) -> Option<Self> {
        let (negatif, reste) = match texte.as_bytes().first() {
            Some(b'-') => (true, &texte[1..]),
            Some(b'+') => (false, &texte[1..]),
            _ => (false, texte),
        };

        let (corps, exposant) = match reste.find(['e', 'E']) {
            Some(k) => {
                let txt = &reste[k + 1..];
                let sans_signe = txt.strip_prefix(['+', '-']).unwrap_or(txt);
                if sans_signe.is_empty() || !sans_signe.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                (&reste[..k], txt.parse::<i64>().ok()?)
            }
            None => (reste, 0),
        };
        if exposant.abs() > LIMITE_EXPOSANT_LITTERAL {
            return None;
        }

        let (entiere, fraction) = corps.split_once('.').unwrap_or((corps, ""));
        if entiere.is_empty() && fraction.is_empty() {
            return None;
        }
        let chiffres_ok = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !chiffres_ok(entiere) || !chiffres_ok(fraction) {
            return None;
        }

        let chiffres = format!("{entiere}{fraction}");
        let mut mantisse = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
        if negatif {
            mantisse = -mantisse;
        }

        Some(Self {
            mantisse,
            echelle: fraction.len() as i64 - exposant,
        })
    }

    pub fn est_zero(&self) -> bool {
        self.mantisse.is_zero()
    }

    pub fn est_negatif(&self) -> bool {
        self.mantisse.is_negative()
    }

    /// -1, 0 ou 1.
    pub fn signe(&self) -> i8 {
        if self.mantisse.is_zero() {
            0
        } else if self.mantisse.is_negative() {
            -1
        } else {
            1
        }
    }

    /// Exposant ajusté : position du chiffre de tête (1234.5 -> 3, 0.01 -> -2).
    pub fn exposant(&self) -> i64 {
        nb_chiffres(&self.mantisse) as i64 - 1 - self.echelle
    }

    pub fn neg(&self) -> Self {
        Self {
            mantisse: -&self.mantisse,
            echelle: self.echelle,
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            mantisse: self.mantisse.abs(),
            echelle: self.echelle,
        }
    }

    /// × 10^n (exact).
    pub fn decaler(&self, n: i64) -> Self {
        Self {
            mantisse: self.mantisse.clone(),
            echelle: self.echelle - n,
        }
    }

    /* ------------------------ Arrondi ------------------------ */

    /// Arrondi HALF_UP à `prec` chiffres significatifs.
    pub fn arrondir(&self, prec: Precision) -> Self {
        let n = nb_chiffres(&self.mantisse);
        let p = prec.chiffres() as u64;
        if n <= p {
            return self.clone();
        }

        let d = n - p;
        let diviseur = pow10(d);
        let mut q = &self.mantisse / &diviseur;
        let r = &self.mantisse % &diviseur;

        if r.magnitude() * 2u32 >= *diviseur.magnitude() {
            if self.mantisse.is_negative() {
                q -= 1u32;
            } else {
                q += 1u32;
            }
        }

        let mut echelle = self.echelle - d as i64;

        // 999 -> 1000 : on retire le zéro en trop (exact)
        if nb_chiffres(&q) > p {
            q /= 10u32;
            echelle -= 1;
        }

        Self {
            mantisse: q,
            echelle,
        }
    }

    /// Retire les zéros de queue tant que l’échelle reste > `echelle_min`.
    pub fn sans_zeros_jusqua(&self, echelle_min: i64) -> Self {
        if self.est_zero() {
            return Self::zero();
        }

        let dix = BigInt::from(10);
        let mut mantisse = self.mantisse.clone();
        let mut echelle = self.echelle;
        while echelle > echelle_min && (&mantisse % &dix).is_zero() {
            mantisse /= 10u32;
            echelle -= 1;
        }

        Self { mantisse, echelle }
    }

    /// Entier le plus proche (HALF_UP).
    pub fn entier_proche(&self) -> BigInt {
        // |x| < 0.1 (ou nul) : pas de 10^echelle matérialisé
        if self.est_zero() || self.exposant() < -1 {
            return BigInt::zero();
        }
        if self.echelle <= 0 {
            return &self.mantisse * pow10(self.echelle.unsigned_abs());
        }

        let diviseur = pow10(self.echelle as u64);
        let mut q = &self.mantisse / &diviseur;
        let r = &self.mantisse % &diviseur;
        if r.magnitude() * 2u32 >= *diviseur.magnitude() {
            if self.mantisse.is_negative() {
                q -= 1u32;
            } else {
                q += 1u32;
            }
        }
        q
    }

    /// Vrai si la valeur est entière (5, 5.00, 1E+3).
    pub fn est_entier(&self) -> bool {
        if self.echelle <= 0 || self.est_zero() {
            return true;
        }
        let e = self.echelle as u64;
        if e >= nb_chiffres(&self.mantisse) {
            // |valeur| < 1 et non nulle
            return false;
        }
        (&self.mantisse % pow10(e)).is_zero()
    }

    /// Valeur entière en i64 (None si non entière ou trop grande).
    pub fn vers_i64(&self) -> Option<i64> {
        if self.est_zero() {
            return Some(0);
        }
        if !self.est_entier() || self.exposant() > 18 {
            return None;
        }
        let n = if self.echelle <= 0 {
            &self.mantisse * pow10(self.echelle.unsigned_abs())
        } else {
            &self.mantisse / pow10(self.echelle as u64)
        };
        n.to_i64()
    }

    /// Garde-fou d’exposant (anti-gel mémoire).
    pub fn verifier(self) -> Result<Self, EvalError> {
        if !self.est_zero() && self.exposant().abs() > LIMITE_EXPOSANT {
            return Err(EvalError::Overflow);
        }
        Ok(self)
    }

    /* ------------------------ Opérations (arrondies) ------------------------ */

    pub fn additionner(&self, autre: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
        if self.est_zero() {
            return autre.arrondir(prec).verifier();
        }
        if autre.est_zero() {
            return self.arrondir(prec).verifier();
        }

        let (grand, petit) = if self.exposant() >= autre.exposant() {
            (self, autre)
        } else {
            (autre, self)
        };

        // Si `petit` est entièrement sous le dernier chiffre de `grand` ET sous la position
        // d’arrondi, seul son signe compte : un témoin ±10^seuil donne le même arrondi
        // (évite d’aligner 1E+999999999 + 1 chiffre par chiffre).
        let p = prec.chiffres() as i64;
        let seuil = (grand.exposant() - p - 3).min(-grand.echelle - 1);
        let temoin;
        let petit = if petit.exposant() < seuil {
            temoin = Decimal {
                mantisse: petit.mantisse.signum(),
                echelle: -seuil,
            };
            &temoin
        } else {
            petit
        };

        let echelle = grand.echelle.max(petit.echelle);
        let ma = &grand.mantisse * pow10((echelle - grand.echelle) as u64);
        let mb = &petit.mantisse * pow10((echelle - petit.echelle) as u64);

        Decimal {
            mantisse: ma + mb,
            echelle,
        }
        .arrondir(prec)
        .verifier()
    }

    pub fn soustraire(&self, autre: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
        self.additionner(&autre.neg(), prec)
    }

    pub fn multiplier(&self, autre: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
        Decimal {
            mantisse: &self.mantisse * &autre.mantisse,
            echelle: self.echelle + autre.echelle,
        }
        .arrondir(prec)
        .verifier()
    }

    /// Division arrondie ; zéros de queue retirés jusqu’à l’échelle préférée
    /// `echelle(a) - echelle(b)` (6/2 -> 3, 1/4 -> 0.25).
    pub fn diviser(&self, autre: &Decimal, prec: Precision) -> Result<Decimal, EvalError> {
        if autre.est_zero() {
            return Err(EvalError::DivisionByZero);
        }
        if self.est_zero() {
            return Ok(Decimal::zero());
        }

        let p = prec.chiffres() as i64;
        let da = nb_chiffres(&self.mantisse) as i64;
        let db = nb_chiffres(&autre.mantisse) as i64;

        // quotient tronqué avec au moins p+1 chiffres : le premier chiffre écarté
        // suffit à décider l’arrondi HALF_UP
        let k = (p + 2 + db - da).max(0);
        let q = (&self.mantisse * pow10(k as u64)) / &autre.mantisse;

        let preferee = self.echelle - autre.echelle;
        Decimal {
            mantisse: q,
            echelle: preferee + k,
        }
        .arrondir(prec)
        .sans_zeros_jusqua(preferee)
        .verifier()
    }

    /// Comparaison numérique (2.0 == 2).
    pub fn comparer(&self, autre: &Decimal) -> Ordering {
        let (sa, sb) = (self.signe(), autre.signe());
        if sa != sb {
            return sa.cmp(&sb);
        }
        if sa == 0 {
            return Ordering::Equal;
        }

        let ord_abs = match self.exposant().cmp(&autre.exposant()) {
            Ordering::Equal => {
                // même exposant : l’écart d’échelle est borné par le nombre de chiffres
                let echelle = self.echelle.max(autre.echelle);
                let ma = self.mantisse.magnitude() * pow10((echelle - self.echelle) as u64).magnitude();
                let mb = autre.mantisse.magnitude() * pow10((echelle - autre.echelle) as u64).magnitude();
                ma.cmp(&mb)
            }
            o => o,
        };

        if sa < 0 {
            ord_abs.reverse()
        } else {
            ord_abs
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.comparer(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparer(other)
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Decimal::entier(n)
    }
}

/* ------------------------ Affichage ------------------------ */

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coeff = self.mantisse.magnitude().to_str_radix(10);
        let signe = if self.mantisse.is_negative() { "-" } else { "" };
        let ajuste = coeff.len() as i64 - 1 - self.echelle;

        if self.echelle >= 0 && ajuste >= -6 {
            let e = self.echelle as usize;
            if e == 0 {
                return write!(f, "{signe}{coeff}");
            }
            if coeff.len() > e {
                let (ent, frac) = coeff.split_at(coeff.len() - e);
                return write!(f, "{signe}{ent}.{frac}");
            }
            let zeros = "0".repeat(e - coeff.len());
            return write!(f, "{signe}0.{zeros}{coeff}");
        }

        let (tete, queue) = coeff.split_at(1);
        write!(f, "{signe}{tete}")?;
        if !queue.is_empty() {
            write!(f, ".{queue}")?;
        }
        if ajuste >= 0 {
            write!(f, "E+{ajuste}")
        } else {
            write!(f, "E{ajuste}")
        }
    }
}
