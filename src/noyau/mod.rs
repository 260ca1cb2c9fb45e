//! Noyau décimal à précision arbitraire
//!
//! Organisation interne :
//! - erreurs.rs        : LexError / EvalError / CalcError
//! - decimal.rs        : Decimal (BigInt × 10^-échelle) + Precision, arrondi HALF_UP
//! - transcendantes.rs : π, e, exp, ln, log, √, trigo, hyperboliques, puissance, factorielle
//! - jetons.rs         : tokenisation
//! - eval.rs           : évaluation à deux piles (opérandes / opérateurs)
//! - passerelle.rs     : evaluate_expression + répartiteur d’appels hôte

pub mod decimal;
pub mod erreurs;
pub mod eval;
pub mod jetons;
pub mod passerelle;
pub mod transcendantes;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use decimal::{Decimal, Precision};
pub use erreurs::{CalcError, EvalError, LexError};
pub use eval::evaluate;
pub use jetons::{format_jetons, tokenize, Tok};
pub use passerelle::{appel_canal, evaluate_expression, EvaluationError, PRECISION_MAX};
