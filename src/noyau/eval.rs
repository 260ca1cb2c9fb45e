//! Noyau : évaluation (deux piles, sans AST)
//!
//! jetons -> pile d’opérandes (Decimal) + pile d’opérateurs en attente -> Decimal
//!
//! - Moins unaire : en tête, après un opérateur ou après '('.
//!   Devant un nombre il est absorbé dans le littéral ; devant '(' il devient
//!   une négation différée (précédence 3) ; ailleurs c’est une erreur.
//! - Fonctions : l’argument (entre parenthèses, imbrication conservée) est
//!   évalué récursivement sur la sous-tranche, puis la fonction est appliquée.
//! - Associativité à gauche partout (2^3^2 = 64).

use tracing::trace;

use super::decimal::{Decimal, Precision};
use super::erreurs::EvalError;
use super::jetons::{Constante, Op, Tok};
use super::transcendantes::{self, Fonction, FACTORIELLE_MAX};

/// Entrée de la pile d’opérateurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EnAttente {
    Binaire(Op),
    /// `-(` : négation appliquée une fois la parenthèse réduite.
    Negation,
    LPar,
}

fn precedence(e: EnAttente) -> u8 {
    match e {
        EnAttente::Binaire(Op::Plus | Op::Minus) => 1,
        EnAttente::Binaire(Op::Star | Op::Slash | Op::Obelus) => 2,
        EnAttente::Binaire(Op::Caret) => 3,
        EnAttente::Negation => 3,
        EnAttente::Binaire(Op::C | Op::P | Op::Bang) => 0,
        EnAttente::LPar => 0,
    }
}

/// `-` en position `i` est-il unaire ?
fn moins_unaire(tokens: &[Tok], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    matches!(
        tokens[i - 1],
        Tok::LPar
            | Tok::Op(Op::Plus | Op::Minus | Op::Star | Op::Slash | Op::Obelus | Op::Caret)
    )
}

fn lire_nombre(txt: &str) -> Result<Decimal, EvalError> {
    Decimal::lire(txt).ok_or_else(|| EvalError::MalformedNumber(txt.to_string()))
}

fn constante(c: Constante, prec: Precision) -> Result<Decimal, EvalError> {
    match c {
        Constante::Pi => Ok(transcendantes::pi(prec)),
        Constante::E => transcendantes::e(prec),
    }
}

/// Opération binaire (a op b) à la précision donnée.
fn appliquer_operateur(
    op: Op,
    a: &Decimal,
    b: &Decimal,
    prec: Precision,
) -> Result<Decimal, EvalError> {
    match op {
        Op::Plus => a.additionner(b, prec),
        Op::Minus => a.soustraire(b, prec),
        Op::Star => a.multiplier(b, prec),
        Op::Slash | Op::Obelus => a.diviser(b, prec),
        Op::Caret => transcendantes::puissance(a, b, prec),
        Op::C | Op::P | Op::Bang => Err(EvalError::UnknownOperator(op.symbole())),
    }
}

/// Dépile les opérandes nécessaires, applique, rempile le résultat.
fn appliquer(
    e: EnAttente,
    operandes: &mut Vec<Decimal>,
    prec: Precision,
) -> Result<(), EvalError> {
    match e {
        EnAttente::Negation => {
            let x = operandes.pop().ok_or(EvalError::MalformedExpression)?;
            trace!(operande = %x, "négation différée");
            operandes.push(x.neg());
        }
        EnAttente::Binaire(op) => {
            // droite d’abord, puis gauche
            let b = operandes.pop().ok_or(EvalError::MalformedExpression)?;
            let a = operandes.pop().ok_or(EvalError::MalformedExpression)?;
            trace!(operateur = %op.symbole(), gauche = %a, droite = %b, "application de l’opérateur");
            operandes.push(appliquer_operateur(op, &a, &b, prec)?);
        }
        EnAttente::LPar => return Err(EvalError::UnbalancedParens),
    }
    Ok(())
}

/// `)` : réduit jusqu’à la '(' correspondante, qui est retirée.
fn parenthese_fermante(
    operateurs: &mut Vec<EnAttente>,
    operandes: &mut Vec<Decimal>,
    prec: Precision,
) -> Result<(), EvalError> {
    loop {
        match operateurs.pop() {
            None => return Err(EvalError::UnbalancedParens),
            Some(EnAttente::LPar) => return Ok(()),
            Some(e) => appliquer(e, operandes, prec)?,
        }
    }
}

/// Index de la ')' qui ferme la '(' en position `ouvrante`.
fn parenthese_correspondante(tokens: &[Tok], ouvrante: usize) -> Result<usize, EvalError> {
    let mut profondeur: usize = 1;
    for (j, t) in tokens.iter().enumerate().skip(ouvrante + 1) {
        match t {
            Tok::LPar => profondeur += 1,
            Tok::RPar => {
                profondeur -= 1;
                if profondeur == 0 {
                    return Ok(j);
                }
            }
            _ => {}
        }
    }
    Err(EvalError::UnbalancedParens)
}

/// `!` postfixé : l’opérande doit être un entier naturel ≤ FACTORIELLE_MAX.
fn factorielle(operandes: &mut Vec<Decimal>, prec: Precision) -> Result<(), EvalError> {
    let x = operandes
        .pop()
        .ok_or_else(|| EvalError::InvalidFactorial("opérande manquant".to_string()))?;

    let n = x
        .vers_i64()
        .filter(|n| (0..=FACTORIELLE_MAX).contains(n))
        .ok_or_else(|| EvalError::InvalidFactorial(x.to_string()))?;

    trace!(n, "factorielle");
    operandes.push(transcendantes::factorielle(n as u64, prec)?);
    Ok(())
}

/// Évalue une suite de jetons à la précision donnée.
///
/// Seul le résultat final est arrondi à `prec` : un littéral seul, ou passé
/// tel quel en argument de fonction, reste exact jusque-là.
pub fn evaluate(tokens: &[Tok], prec: Precision) -> Result<Decimal, EvalError> {
    evaluer(tokens, prec)?.arrondir(prec).verifier()
}

/// Réentrante : les arguments de fonctions sont évalués par un appel récursif
/// sur la sous-tranche entre parenthèses. Aucun état ne survit à l’appel.
fn evaluer(tokens: &[Tok], prec: Precision) -> Result<Decimal, EvalError> {
    let mut operandes: Vec<Decimal> = Vec::new();
    let mut operateurs: Vec<EnAttente> = Vec::new();

    let mut i: usize = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Tok::Num(txt) => operandes.push(lire_nombre(txt)?),

            Tok::Const(c) => operandes.push(constante(*c, prec)?),

            Tok::Op(Op::Bang) => factorielle(&mut operandes, prec)?,

            Tok::Op(Op::Minus) if moins_unaire(tokens, i) => match tokens.get(i + 1) {
                Some(Tok::Num(txt)) => {
                    operandes.push(lire_nombre(txt)?.neg());
                    i += 1;
                }
                Some(Tok::LPar) => operateurs.push(EnAttente::Negation),
                _ => return Err(EvalError::InvalidUnaryMinus),
            },

            Tok::Op(op) => {
                let courant = EnAttente::Binaire(*op);
                while let Some(&sommet) = operateurs.last() {
                    if sommet == EnAttente::LPar || precedence(sommet) < precedence(courant) {
                        break;
                    }
                    operateurs.pop();
                    appliquer(sommet, &mut operandes, prec)?;
                }
                operateurs.push(courant);
            }

            Tok::LPar => operateurs.push(EnAttente::LPar),

            Tok::RPar => parenthese_fermante(&mut operateurs, &mut operandes, prec)?,

            Tok::Ident(nom) => {
                let f = Fonction::depuis_nom(nom)
                    .ok_or_else(|| EvalError::UnknownToken(nom.clone()))?;
                if tokens.get(i + 1) != Some(&Tok::LPar) {
                    return Err(EvalError::MissingOpenParen(nom.clone()));
                }

                let fermante = parenthese_correspondante(tokens, i + 1)?;
                let argument = evaluer(&tokens[i + 2..fermante], prec)?;
                trace!(fonction = f.nom(), argument = %argument, "appel de fonction");
                operandes.push(f.appliquer(&argument, prec)?);
                i = fermante;
            }
        }
        i += 1;
    }

    while let Some(e) = operateurs.pop() {
        appliquer(e, &mut operandes, prec)?;
    }

    let resultat = operandes.pop().ok_or(EvalError::MalformedExpression)?;
    if !operandes.is_empty() {
        return Err(EvalError::MalformedExpression);
    }
    Ok(resultat)
}
