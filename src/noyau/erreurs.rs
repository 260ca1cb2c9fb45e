//! Erreurs du noyau (lexer + évaluateur).
//!
//! Toutes les erreurs sont terminales pour un appel : pas de reprise, pas de résultat partiel.

use thiserror::Error;

/// Erreur de tokenisation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("caractère invalide dans l’expression : '{0}'")]
    InvalidCharacter(char),
}

/// Erreur d’évaluation (pile opérandes / opérateurs, arithmétique).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("nombre mal formé : {0:?}")]
    MalformedNumber(String),

    #[error("usage invalide du moins unaire")]
    InvalidUnaryMinus,

    #[error("opérateur inconnu : '{0}'")]
    UnknownOperator(char),

    #[error("parenthèses non équilibrées")]
    UnbalancedParens,

    #[error("usage invalide de la factorielle (!) : {0}")]
    InvalidFactorial(String),

    #[error("'(' attendue après la fonction {0}")]
    MissingOpenParen(String),

    #[error("jeton inconnu : {0:?}")]
    UnknownToken(String),

    #[error("expression mal formée")]
    MalformedExpression,

    #[error("division par zéro")]
    DivisionByZero,

    #[error("{fonction} : argument hors domaine ({valeur})")]
    DomainError {
        fonction: &'static str,
        valeur: String,
    },

    #[error("dépassement de capacité (exposant hors limites)")]
    Overflow,
}

/// Erreur de calcul complète : lexer OU évaluateur.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
