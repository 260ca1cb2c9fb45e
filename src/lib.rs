//! Papier de calcul : évaluation d’expressions en décimal à précision arbitraire.
//!
//! Le noyau est sans état : `evaluate_expression(texte, précision)` est une
//! fonction pure de ses deux entrées.

pub mod noyau;
