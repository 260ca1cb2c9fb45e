//! Tests scientifiques (campagne) : identités + invariants + limites contrôlées.
//!
//! But : vérifier le noyau décimal “de bout en bout” (texte -> texte).
//! - identités numériques vérifiées à une tolérance (chaque opération arrondit)
//! - idempotence et allers-retours exacts
//! - stress borné avec budget temps global
//!
//! Notes :
//! - Les identités passent par l’API publique (`evaluate_expression`) puis relisent
//!   le texte produit : on teste aussi le rendu.
//! - Tolérance : quelques ulp à la précision demandée (erreurs d’arrondi cumulées).

use std::time::{Duration, Instant};

use super::{evaluate_expression, Decimal, Precision};

fn eval_ok(expr: &str, digits: u32) -> String {
    evaluate_expression(expr, digits).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn lire(txt: &str) -> Decimal {
    Decimal::lire(txt).unwrap_or_else(|| panic!("rendu illisible : {txt:?}"))
}

/// |eval(expr) - attendu| ≤ tolerance
fn assert_proche(expr: &str, attendu: &str, digits: u32, tolerance: &str) {
    let obtenu = eval_ok(expr, digits);
    let travail = Precision::new(digits + 10).unwrap();
    let ecart = lire(&obtenu)
        .soustraire(&lire(attendu), travail)
        .unwrap()
        .abs();
    assert!(
        ecart <= lire(tolerance),
        "expr={expr:?} obtenu={obtenu} attendu={attendu} écart={ecart}"
    );
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    assert_eq!(eval_ok(expr, 50), attendu, "expr={expr:?}");
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Propriétés de base ------------------------ */

#[test]
fn sci_precedence_et_factorielle() {
    assert_exact_eq("2+3*4", "14");
    assert_exact_eq("(2+3)*4", "20");
    assert_exact_eq("-5+3", "-2");
    assert_exact_eq("2^10", "1024");
    assert_exact_eq("5!", "120");
    assert_exact_eq("0!", "1");
    assert_exact_eq("sin(0)", "0");
    assert_exact_eq("√(4)", "2");
    assert_exact_eq("10!/9!", "10");
    assert_exact_eq("log(1000)", "3");
    assert_exact_eq("√(144)", "12");
    assert_exact_eq("exp(0)", "1");
}

#[test]
fn sci_litteraux_arrondis() {
    let cas = [
        ("3.14159", 3, "3.14"),
        ("2.5", 1, "3"),
        ("-2.5", 1, "-3"),
        ("0.000123456", 2, "0.00012"),
        ("123456", 2, "1.2E+5"),
        ("1.50", 10, "1.50"),
        ("6.02214076E23", 4, "6.022E+23"),
    ];
    for (expr, p, attendu) in cas {
        assert_eq!(eval_ok(expr, p), attendu, "expr={expr:?} p={p}");
    }
}

/* ------------------------ Identités (tolérance) ------------------------ */

#[test]
fn sci_identites_trig() {
    let tol = "1E-25";
    assert_proche("sin(0.7)^2+cos(0.7)^2", "1", 30, tol);
    assert_proche("sin(1000)^2+cos(1000)^2", "1", 30, tol);
    assert_proche("tan(0.3)-sin(0.3)/cos(0.3)", "0", 30, tol);
    assert_proche("arcsin(sin(0.5))", "0.5", 30, tol);
    assert_proche("arccos(cos(1.2))", "1.2", 30, tol);
    assert_proche("arctan(tan(-0.4))", "-0.4", 30, tol);
    assert_proche("sin(π)", "0", 30, tol);
    assert_proche("cos(π)", "-1", 30, tol);
    assert_proche("4*arctan(1)", "3.14159265358979323846264338328", 30, tol);
}

#[test]
fn sci_periodicite() {
    let tol = "1E-25";
    assert_proche("sin(0.5+2*π)-sin(0.5)", "0", 30, tol);
    assert_proche("cos(0.5-6*π)-cos(0.5)", "0", 30, tol);
    assert_proche("sin(-0.5)+sin(0.5)", "0", 30, tol);
}

#[test]
fn sci_identites_exp_ln() {
    let tol = "1E-25";
    assert_proche("exp(ln(7.25))", "7.25", 30, tol);
    assert_proche("ln(exp(3))", "3", 30, tol);
    assert_proche("ln(2)+ln(5)", "2.30258509299404568401799145468", 30, tol);
    assert_proche("log(2)*ln(10)-ln(2)", "0", 30, tol);
    assert_proche("e^2-exp(2)", "0", 30, tol);
    assert_proche("2^0.5-√(2)", "0", 30, tol);
    assert_proche("√(2)^2", "2", 30, tol);
    assert_proche("sinh(1.3)^2-cosh(1.3)^2", "-1", 30, tol);
    assert_proche("tanh(0.8)-sinh(0.8)/cosh(0.8)", "0", 30, tol);
}

/* ------------------------ Idempotence / allers-retours ------------------------ */

#[test]
fn sci_idempotence() {
    for expr in ["1/7", "sin(1)+π", "2^0.3", "50!", "ln(3)*e"] {
        for p in [5, 30] {
            let a = eval_ok(expr, p);
            let b = eval_ok(expr, p);
            assert_eq!(a, b, "expr={expr:?} p={p}");
        }
    }
}

#[test]
fn sci_aller_retour_entiers() {
    let grand = format!("1{}", "0".repeat(50));
    let entiers = [
        "0",
        "7",
        "-42",
        "1234567890",
        "-98765432109876543210",
        grand.as_str(),
    ];
    for n in entiers {
        let p = n.len() as u32 + 1;
        assert_eq!(eval_ok(n, p), n, "n={n}");
    }
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_somme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let expr = vec!["0.5"; 200].join("+");
    budget(t0, max);

    // 200 × 0.5, échelle 1 conservée
    assert_eq!(eval_ok(&expr, 20), "100.0");
    budget(t0, max);
}

#[test]
fn sci_stress_profondeur() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let expr = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    assert_eq!(eval_ok(&expr, 10), "1");
    budget(t0, max);

    let mut expr = "65536".to_string();
    for _ in 0..4 {
        expr = format!("√({expr})");
    }
    assert_eq!(eval_ok(&expr, 10), "2");
    budget(t0, max);
}

#[test]
fn sci_stress_grands_nombres() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let deux_1000 = eval_ok("2^1000", 400);
    assert_eq!(deux_1000.len(), 302);
    assert!(deux_1000.starts_with("10715086071862673209"));
    budget(t0, max);

    assert_eq!(eval_ok("1000!", 20), "4.0238726007709377354E+2567");
    budget(t0, max);

    assert_eq!(eval_ok("1E999999999*10", 5), "1.0E+1000000000");
    budget(t0, max);
}
