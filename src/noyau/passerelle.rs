//! Passerelle hôte -> noyau
//!
//! `evaluate_expression` : point d’entrée unique (texte + précision -> texte).
//! `appel_canal` : répartiteur façon “method channel” (nom de méthode + table
//! d’arguments JSON), avec les codes d’erreur attendus par l’hôte.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::decimal::Precision;
use super::erreurs::CalcError;
use super::eval::evaluate;
use super::jetons::tokenize;

/// Nom du canal côté hôte.
pub const CANAL: &str = "calculating_paper/calculation";

/// Seule méthode servie par le canal.
pub const METHODE_EVALUATION: &str = "evaluateExpression";

/// Précision maximale acceptée (chiffres significatifs).
pub const PRECISION_MAX: u32 = 10_000;

/// Erreur renvoyée à l’hôte : un code stable + un message lisible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("arguments invalides : {0}")]
    InvalidArguments(String),

    #[error("expression vide ou précision absente")]
    InvalidInput,

    #[error("méthode non implémentée : {0}")]
    NotImplemented(String),

    #[error("erreur d’évaluation : {0}")]
    Evaluation(#[from] CalcError),
}

impl EvaluationError {
    pub fn code(&self) -> &'static str {
        match self {
            EvaluationError::InvalidArguments(_) => "INVALID_ARGUMENTS",
            EvaluationError::InvalidInput => "INVALID_INPUT",
            EvaluationError::NotImplemented(_) => "NOT_IMPLEMENTED",
            EvaluationError::Evaluation(_) => "EVALUATION_ERROR",
        }
    }
}

fn precision_valide(precision: i64) -> Result<Precision, EvaluationError> {
    u32::try_from(precision)
        .ok()
        .filter(|p| *p <= PRECISION_MAX)
        .and_then(Precision::new)
        .ok_or_else(|| {
            EvaluationError::InvalidArguments(format!(
                "précision {precision} hors de [1, {PRECISION_MAX}]"
            ))
        })
}

/// Évalue `expression` (préfixe `=` toléré) à `precision` chiffres significatifs.
pub fn evaluate_expression(expression: &str, precision: u32) -> Result<String, EvaluationError> {
    debug!(expression, precision, "évaluation demandée");

    if expression.trim().is_empty() {
        return Err(EvaluationError::InvalidInput);
    }
    let prec = precision_valide(i64::from(precision))?;

    let texte = expression.strip_prefix('=').unwrap_or(expression);

    let resultat = tokenize(texte)
        .map_err(CalcError::from)
        .and_then(|jetons| evaluate(&jetons, prec).map_err(CalcError::from));

    match resultat {
        Ok(v) => Ok(v.to_string()),
        Err(e) => {
            warn!(expression, erreur = %e, "évaluation échouée");
            Err(e.into())
        }
    }
}

/// Répartiteur d’appels : `arguments` doit être un objet
/// `{ "expression": string, "precision": integer }`.
pub fn appel_canal(methode: &str, arguments: Option<&Value>) -> Result<String, EvaluationError> {
    debug!(canal = CANAL, methode, "appel reçu");

    if methode != METHODE_EVALUATION {
        return Err(EvaluationError::NotImplemented(methode.to_string()));
    }

    let table = arguments.and_then(Value::as_object).ok_or_else(|| {
        EvaluationError::InvalidArguments("arguments absents ou mal formés".to_string())
    })?;

    let expression = table.get("expression").and_then(Value::as_str);
    let precision = table.get("precision").and_then(Value::as_i64);

    match (expression, precision) {
        (Some(expr), Some(p)) if !expr.trim().is_empty() => {
            let prec = precision_valide(p)?;
            evaluate_expression(expr, prec.chiffres())
        }
        _ => Err(EvaluationError::InvalidInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::erreurs::{EvalError, LexError};
    use serde_json::json;

    #[test]
    fn evaluation_directe() {
        assert_eq!(evaluate_expression("2+3*4", 10).unwrap(), "14");
        assert_eq!(evaluate_expression("=2+3*4", 10).unwrap(), "14");
        assert_eq!(evaluate_expression("1/3", 5).unwrap(), "0.33333");
        assert_eq!(evaluate_expression("  √(4) ", 10).unwrap(), "2");
    }

    #[test]
    fn erreurs_directes() {
        assert_eq!(evaluate_expression("   ", 10), Err(EvaluationError::InvalidInput));
        assert_eq!(evaluate_expression("1+1", 0).unwrap_err().code(), "INVALID_ARGUMENTS");
        assert_eq!(
            evaluate_expression("1+1", PRECISION_MAX + 1).unwrap_err().code(),
            "INVALID_ARGUMENTS"
        );

        let e = evaluate_expression("1/0", 10).unwrap_err();
        assert_eq!(e.code(), "EVALUATION_ERROR");
        assert_eq!(
            e,
            EvaluationError::Evaluation(CalcError::Eval(EvalError::DivisionByZero))
        );

        let e = evaluate_expression("2#3", 10).unwrap_err();
        assert_eq!(
            e,
            EvaluationError::Evaluation(CalcError::Lex(LexError::InvalidCharacter('#')))
        );
        assert!(e.to_string().contains('#'));

        // "=" seul : non vide avant retrait du préfixe, vide après
        assert_eq!(
            evaluate_expression("=", 10),
            Err(EvaluationError::Evaluation(CalcError::Eval(
                EvalError::MalformedExpression
            )))
        );
    }

    #[test]
    fn canal_nominal() {
        let args = json!({ "expression": "=(2+3)*4", "precision": 32 });
        assert_eq!(appel_canal(METHODE_EVALUATION, Some(&args)).unwrap(), "20");
    }

    #[test]
    fn canal_codes_erreur() {
        let code = |m: &str, a: Option<&Value>| appel_canal(m, a).unwrap_err().code();

        assert_eq!(code("autre", None), "NOT_IMPLEMENTED");
        assert_eq!(code(METHODE_EVALUATION, None), "INVALID_ARGUMENTS");
        assert_eq!(code(METHODE_EVALUATION, Some(&json!([1, 2]))), "INVALID_ARGUMENTS");

        let sans_precision = json!({ "expression": "1+1" });
        assert_eq!(code(METHODE_EVALUATION, Some(&sans_precision)), "INVALID_INPUT");

        let expression_vide = json!({ "expression": " ", "precision": 10 });
        assert_eq!(code(METHODE_EVALUATION, Some(&expression_vide)), "INVALID_INPUT");

        let precision_texte = json!({ "expression": "1", "precision": "10" });
        assert_eq!(code(METHODE_EVALUATION, Some(&precision_texte)), "INVALID_INPUT");

        let precision_negative = json!({ "expression": "1", "precision": -3 });
        assert_eq!(code(METHODE_EVALUATION, Some(&precision_negative)), "INVALID_ARGUMENTS");

        let invalide = json!({ "expression": "(1+2", "precision": 10 });
        assert_eq!(code(METHODE_EVALUATION, Some(&invalide)), "EVALUATION_ERROR");
    }
}
