//! src/app/etat.rs
//!
//! État UI (sans vue, sans noyau).
//!
//! Rôle : contenir l’état du papier de calcul (entrée, dernier résultat, erreur,
//! précision, trace des jetons, feuille des lignes évaluées) et offrir des
//! opérations simples (C/CLR/AC, effacement intelligent, reprise d’un résultat).
//!
//! Contrats :
//! - Aucune évaluation ici (pas de noyau, pas de parsing).
//! - Actions déterministes, sans effet de bord caché.
//! - Bornes : précision dans [1, PRECISION_MAX_UI], feuille limitée à FEUILLE_MAX lignes.

/// Précision par défaut (chiffres significatifs).
pub const PRECISION_DEFAUT: u32 = 32;

/// Garde-fou UI : au-delà, l’affichage devient illisible (le noyau accepte plus).
pub const PRECISION_MAX_UI: u32 = 500;

/// Nombre maximal de lignes conservées sur la feuille (les plus anciennes partent).
pub const FEUILLE_MAX: usize = 100;

/// Motifs retirés d’un bloc par l’effacement intelligent (les plus longs d’abord).
const MOTIFS_EFFACEMENT: &[&str] = &[
    "arcsin(", "arccos(", "arctan(", "sinh(", "cosh(", "tanh(", "sin(", "cos(", "tan(", "log(",
    "exp(", "ln(", "√(",
];

/// Une ligne de la feuille : ce qui a été tapé, ce qui est sorti.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ligne {
    pub expression: String,
    pub resultat: String,
    pub precision: u32,
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String,
    pub erreur: String,
    pub jetons: String, // trace de tokenisation de la dernière évaluation

    // --- feuille (historique) ---
    pub feuille: Vec<Ligne>,

    // --- paramètres ---
    pub precision: u32,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            entree: String::new(),
            resultat: String::new(),
            erreur: String::new(),
            jetons: String::new(),
            feuille: Vec::new(),
            precision: PRECISION_DEFAUT,
            focus_entree: true,
        }
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + feuille + précision par défaut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.feuille.clear();
        self.precision = PRECISION_DEFAUT;
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur + trace (sans toucher à l’entrée ni à la feuille).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.jetons.clear();
        self.focus_entree = true;
    }

    /// Place une erreur. Le dernier résultat reste affiché ; la trace est conservée
    /// (utile pour voir où le lexer s’est arrêté).
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.focus_entree = true;
    }

    /// Dépose un résultat et l’ajoute à la feuille.
    pub fn set_resultat(&mut self, expression: &str, resultat: String) {
        self.erreur.clear();
        self.resultat = resultat.clone();

        self.feuille.push(Ligne {
            expression: expression.to_string(),
            resultat,
            precision: self.precision,
        });
        if self.feuille.len() > FEUILLE_MAX {
            let surplus = self.feuille.len() - FEUILLE_MAX;
            self.feuille.drain(..surplus);
        }

        self.focus_entree = true;
    }

    /// Garde-fou : précision bornée à [1, PRECISION_MAX_UI].
    pub fn set_precision(&mut self, precision: u32) {
        self.precision = precision.clamp(1, PRECISION_MAX_UI);
        self.focus_entree = true;
    }

    /// Recopie le résultat d’une ligne de la feuille au bout de l’entrée (entre parenthèses).
    pub fn reprendre(&mut self, index: usize) {
        if let Some(ligne) = self.feuille.get(index) {
            let r = ligne.resultat.clone();
            self.entree.push('(');
            self.entree.push_str(&r);
            self.entree.push(')');
        }
        self.focus_entree = true;
    }

    pub fn vider_feuille(&mut self) {
        self.feuille.clear();
        self.focus_entree = true;
    }

    /// Backspace “intelligent” : retire d’un coup un nom de fonction complet ("arcsin(", "√(" …).
    pub fn backspace_entree(&mut self) {
        while self.entree.ends_with(' ') {
            self.entree.pop();
        }

        match MOTIFS_EFFACEMENT.iter().find(|m| self.entree.ends_with(**m)) {
            Some(motif) => {
                let garde = self.entree.len() - motif.len();
                self.entree.truncate(garde);
            }
            None => {
                self.entree.pop();
            }
        }

        while self.entree.ends_with(' ') {
            self.entree.pop();
        }
        self.focus_entree = true;
    }

    /// Backspace clavier : `avant` est le texte d’avant l’édition du TextEdit.
    /// Seul le '(' final retiré déclenche l’effacement du nom de fonction ;
    /// toute autre édition (lettre, milieu de ligne) est laissée telle quelle.
    pub fn completer_effacement(&mut self, avant: &str) {
        if avant.strip_suffix('(') != Some(self.entree.as_str()) {
            return;
        }
        self.entree = avant.to_string();
        self.backspace_entree();
    }
}
