//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur et longueur bornées
//! - budget temps global
//! - on accepte certaines erreurs attendues (division par zéro, hors domaine, dépassement…)
//! - invariant clé : aucune panique, même entrée => même sortie

use std::time::{Duration, Instant};

use super::erreurs::{CalcError, EvalError};
use super::passerelle::EvaluationError;
use super::{evaluate_expression, Decimal};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn choix<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.pick(options.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

/// Liste blanche : erreurs *normales* sur des expressions bien formées
/// dont les valeurs sont tirées au hasard.
fn is_erreur_attendue(e: &EvaluationError) -> bool {
    matches!(
        e,
        EvaluationError::Evaluation(CalcError::Eval(
            EvalError::DivisionByZero
                | EvalError::DomainError { .. }
                | EvalError::Overflow
                | EvalError::InvalidFactorial(_)
        ))
    )
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const ATOMES: &[&str] = &[
    "0", "1", "2", "3", "7", "1.5", "0.25", "2E-3", "π", "e", "(-3)", "3!", "(2+2)!",
];

const FONCTIONS: &[&str] = &[
    "sin", "cos", "tan", "arctan", "sinh", "cosh", "tanh", "√", "ln", "log", "exp", "arcsin",
    "arccos",
];

const OPERATEURS: &[&str] = &["+", "-", "*", "/", "÷"];

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return rng.choix(ATOMES).to_string();
    }

    match rng.pick(6) {
        0 => rng.choix(ATOMES).to_string(),
        1 | 2 => {
            let op = rng.choix(OPERATEURS);
            format!(
                "({}{op}{})",
                gen_expr(rng, depth - 1),
                gen_expr(rng, depth - 1)
            )
        }
        3 => {
            // puissances petites : on reste loin du garde-fou
            let exposant = rng.choix(&["2", "3", "0.5", "-1"]);
            format!("({})^{exposant}", gen_expr(rng, depth - 1))
        }
        _ => {
            let f = rng.choix(FONCTIONS);
            format!("{f}({})", gen_expr(rng, depth - 1))
        }
    }
}

/// Chaîne arbitraire sur un alphabet “proche” de la calculatrice.
fn gen_bruit(rng: &mut Rng, longueur: usize) -> String {
    const ALPHABET: &[&str] = &[
        "0", "1", "9", ".", "+", "-", "*", "/", "÷", "^", "!", "(", ")", "π", "e", "E", " ",
        "sin", "ln", "√", "C", "P", "#", "=",
    ];
    (0..longueur).map(|_| rng.choix(ALPHABET)).collect()
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_expressions() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    // Même seed => mêmes expressions => mêmes sorties (déterminisme)
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..120 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let digits = 30;

        let premier = evaluate_expression(&expr, digits);
        let second = evaluate_expression(&expr, digits);
        assert_eq!(premier, second, "non déterministe: expr={expr:?}");

        match premier {
            Ok(txt) => {
                // le rendu doit se relire
                assert!(
                    Decimal::lire(&txt).is_some(),
                    "rendu illisible: expr={expr:?} -> {txt:?}"
                );
                seen_ok += 1;
            }
            Err(e) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..400 {
        budget(t0, max);

        let longueur = 1 + rng.pick(12) as usize;
        let expr = gen_bruit(&mut rng, longueur);

        match evaluate_expression(&expr, 20) {
            Ok(txt) => assert!(Decimal::lire(&txt).is_some(), "expr={expr:?} -> {txt:?}"),
            Err(e) => assert!(
                matches!(e.code(), "EVALUATION_ERROR" | "INVALID_INPUT"),
                "code inattendu: expr={expr:?} err={e}"
            ),
        }
    }
}

#[test]
fn fuzz_safe_precision_monotone() {
    // Le résultat à p chiffres est l’arrondi du résultat à p+10 chiffres
    // (hors cas de double arrondi, absents de ces constantes).
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..30 {
        let expr = rng.choix(&["π", "e", "√(2)", "ln(3)", "1/7", "arctan(0.5)"]);
        let p = 5 + rng.pick(25);

        let court = evaluate_expression(expr, p).unwrap();
        let long = evaluate_expression(expr, p + 10).unwrap();

        let arrondi = Decimal::lire(&long)
            .unwrap()
            .arrondir(super::Precision::new(p).unwrap());
        assert_eq!(
            Decimal::lire(&court).unwrap(),
            arrondi,
            "expr={expr:?} p={p} court={court} long={long}"
        );
    }
}
