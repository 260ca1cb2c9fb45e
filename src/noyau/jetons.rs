// src/noyau/jetons.rs
//
// Tokenisation en une passe, avec un tampon courant (nombre OU identifiant).
// Aucune validation sémantique ici : équilibre des parenthèses, précédence
// et noms de fonctions sont l’affaire de l’évaluateur.

use std::fmt;

use super::erreurs::LexError;

/// Opérateurs reconnus par le lexer.
/// `C` et `P` (combinaisons / arrangements) sont lus mais sans sémantique à l’évaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Obelus, // ÷
    Caret,  // ^
    Bang,   // ! (factorielle postfixée)
    C,
    P,
}

impl Op {
    pub fn symbole(self) -> char {
        match self {
            Op::Plus => '+',
            Op::Minus => '-',
            Op::Star => '*',
            Op::Slash => '/',
            Op::Obelus => '÷',
            Op::Caret => '^',
            Op::Bang => '!',
            Op::C => 'C',
            Op::P => 'P',
        }
    }

    fn depuis_symbole(c: char) -> Option<Self> {
        let op = match c {
            '+' => Op::Plus,
            '-' => Op::Minus,
            '*' => Op::Star,
            '/' => Op::Slash,
            '÷' => Op::Obelus,
            '^' => Op::Caret,
            '!' => Op::Bang,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constante {
    Pi,
    E,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    /// Littéral décimal tel que lu (validé plus tard).
    Num(String),

    /// Nom de fonction (sin, ln, √ …) ou identifiant inconnu.
    Ident(String),

    Op(Op),

    LPar,
    RPar,

    Const(Constante),
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Num(txt) => f.write_str(txt),
            Tok::Ident(nom) => f.write_str(nom),
            Tok::Op(op) => write!(f, "{}", op.symbole()),
            Tok::LPar => f.write_str("("),
            Tok::RPar => f.write_str(")"),
            Tok::Const(Constante::Pi) => f.write_str("π"),
            Tok::Const(Constante::E) => f.write_str("e"),
        }
    }
}

/// Tampon courant : les nombres et les identifiants ne le partagent jamais.
enum Tampon {
    Vide,
    Nombre(String),
    Ident(String),
}

impl Tampon {
    /// Vide le tampon dans `out`.
    fn vider(&mut self, out: &mut Vec<Tok>) {
        match std::mem::replace(self, Tampon::Vide) {
            Tampon::Vide => {}
            Tampon::Nombre(txt) => out.push(Tok::Num(txt)),
            Tampon::Ident(nom) => out.push(classer_ident(nom)),
        }
    }

    fn pousser_chiffre(&mut self, c: char, out: &mut Vec<Tok>) {
        if let Tampon::Nombre(txt) = self {
            txt.push(c);
            return;
        }
        self.vider(out);
        *self = Tampon::Nombre(c.to_string());
    }

    fn pousser_lettre(&mut self, c: char, out: &mut Vec<Tok>) {
        if let Tampon::Ident(nom) = self {
            nom.push(c);
            return;
        }
        self.vider(out);
        *self = Tampon::Ident(c.to_string());
    }

    /// Nombre ouvert contenant au moins un chiffre ("5." compte, "." non).
    fn contient_chiffre(&self) -> bool {
        matches!(self, Tampon::Nombre(txt) if txt.contains(|c: char| c.is_ascii_digit()))
    }

    /// Nombre ouvert dont le dernier caractère est un marqueur d’exposant.
    fn finit_par_exposant(&self) -> bool {
        matches!(self, Tampon::Nombre(txt) if txt.ends_with(['E', 'e']))
    }
}

/// Identifiant complet -> jeton : "e" est la constante d’Euler, "C"/"P" des opérateurs.
fn classer_ident(nom: String) -> Tok {
    match nom.as_str() {
        "e" => Tok::Const(Constante::E),
        "C" => Tok::Op(Op::C),
        "P" => Tok::Op(Op::P),
        _ => Tok::Ident(nom),
    }
}

/// `e` minuscule après un chiffre : exposant seulement si suivi de `d` ou `±d`.
fn exposant_suit(chars: &[char], i: usize) -> bool {
    match chars.get(i + 1) {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => chars.get(i + 2).is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - nombres décimaux (12, 1.5, .5, 2E-3, 2e5)
/// - opérateurs + - * ÷ / ^ ! et C / P
/// - parenthèses ( )
/// - π, e
/// - identifiants alphabétiques (sin, arctan, …) et √
pub fn tokenize(s: &str) -> Result<Vec<Tok>, LexError> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut tampon = Tampon::Vide;

    for (i, &c) in chars.iter().enumerate() {
        // Espaces : ignorés, le tampon reste ouvert ("1 2" == "12")
        if c.is_whitespace() {
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            tampon.pousser_chiffre(c, &mut out);
            continue;
        }

        // Exposant : E après un chiffre, e seulement devant des chiffres
        if (c == 'E' || (c == 'e' && exposant_suit(&chars, i))) && tampon.contient_chiffre() {
            tampon.pousser_chiffre(c, &mut out);
            continue;
        }

        // Signe d’exposant : 2E-3
        if (c == '+' || c == '-') && tampon.finit_par_exposant() {
            tampon.pousser_chiffre(c, &mut out);
            continue;
        }

        let seul = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            'π' => Some(Tok::Const(Constante::Pi)),
            '√' => Some(Tok::Ident("√".to_string())),
            _ => Op::depuis_symbole(c).map(Tok::Op),
        };
        if let Some(tok) = seul {
            tampon.vider(&mut out);
            out.push(tok);
            continue;
        }

        if c.is_alphabetic() {
            tampon.pousser_lettre(c, &mut out);
            continue;
        }

        return Err(LexError::InvalidCharacter(c));
    }

    tampon.vider(&mut out);
    Ok(out)
}

/// Format utilitaire (trace UI) : liste de jetons en texte.
pub fn format_jetons(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Tok {
        Tok::Num(s.to_string())
    }

    fn ident(s: &str) -> Tok {
        Tok::Ident(s.to_string())
    }

    #[test]
    fn operateurs_et_nombres() {
        let t = tokenize("2+3*4").unwrap();
        assert_eq!(
            t,
            vec![num("2"), Tok::Op(Op::Plus), num("3"), Tok::Op(Op::Star), num("4")]
        );

        let t = tokenize("10÷4/2^3!").unwrap();
        assert_eq!(
            t,
            vec![
                num("10"),
                Tok::Op(Op::Obelus),
                num("4"),
                Tok::Op(Op::Slash),
                num("2"),
                Tok::Op(Op::Caret),
                num("3"),
                Tok::Op(Op::Bang),
            ]
        );
    }

    #[test]
    fn notation_scientifique() {
        assert_eq!(tokenize("2E-3").unwrap(), vec![num("2E-3")]);
        assert_eq!(tokenize("1.5E+10").unwrap(), vec![num("1.5E+10")]);
        assert_eq!(tokenize("2e5").unwrap(), vec![num("2e5")]);
        assert_eq!(tokenize("2e-5").unwrap(), vec![num("2e-5")]);
        assert_eq!(tokenize("5.E3").unwrap(), vec![num("5.E3")]);
        assert_eq!(tokenize("2.E-3").unwrap(), vec![num("2.E-3")]);
        assert_eq!(tokenize("5.e3").unwrap(), vec![num("5.e3")]);
        assert_eq!(tokenize(".E3").unwrap(), vec![num("."), ident("E"), num("3")]);

        // e sans chiffres derrière : constante d’Euler
        assert_eq!(tokenize("2e").unwrap(), vec![num("2"), Tok::Const(Constante::E)]);
        assert_eq!(
            tokenize("2e+1").unwrap(),
            vec![num("2e+1")]
        );
        assert_eq!(
            tokenize("2e+x").unwrap(),
            vec![num("2"), Tok::Const(Constante::E), Tok::Op(Op::Plus), ident("x")]
        );

        // signe sans exposant : opérateur binaire
        assert_eq!(
            tokenize("2-3").unwrap(),
            vec![num("2"), Tok::Op(Op::Minus), num("3")]
        );
    }

    #[test]
    fn fonctions_et_constantes() {
        let t = tokenize("sin(π)+√(4)*e").unwrap();
        assert_eq!(
            t,
            vec![
                ident("sin"),
                Tok::LPar,
                Tok::Const(Constante::Pi),
                Tok::RPar,
                Tok::Op(Op::Plus),
                ident("√"),
                Tok::LPar,
                num("4"),
                Tok::RPar,
                Tok::Op(Op::Star),
                Tok::Const(Constante::E),
            ]
        );
    }

    #[test]
    fn tampons_separes() {
        // lettre après chiffre : le nombre est vidé d’abord
        assert_eq!(tokenize("2sin").unwrap(), vec![num("2"), ident("sin")]);
        // chiffre après lettre : idem
        assert_eq!(tokenize("ln2").unwrap(), vec![ident("ln"), num("2")]);
        // C et P isolés deviennent des opérateurs
        assert_eq!(
            tokenize("5C2").unwrap(),
            vec![num("5"), Tok::Op(Op::C), num("2")]
        );
        assert_eq!(tokenize("5P2").unwrap()[1], Tok::Op(Op::P));
    }

    #[test]
    fn espaces_ignores() {
        assert_eq!(tokenize("  1 + 2 ").unwrap(), vec![num("1"), Tok::Op(Op::Plus), num("2")]);
        // le tampon n’est pas vidé par un espace
        assert_eq!(tokenize("1 2").unwrap(), vec![num("12")]);
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn caracteres_invalides() {
        assert_eq!(tokenize("2%3"), Err(LexError::InvalidCharacter('%')));
        assert_eq!(tokenize("a=b"), Err(LexError::InvalidCharacter('=')));
        assert_eq!(tokenize("1,5"), Err(LexError::InvalidCharacter(',')));
    }

    #[test]
    fn format() {
        let t = tokenize("-(1.5+π)÷e").unwrap();
        assert_eq!(format_jetons(&t), "- ( 1.5 + π ) ÷ e");
    }
}
