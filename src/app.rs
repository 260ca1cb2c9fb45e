// src/app.rs
//
// Papier de calcul : module App (racine)
// --------------------------------------
// - Sous-modules : etat.rs (état pur) + vue.rs (egui)
// - impl eframe::App (natif + web)
//
// Enter/Backspace sont gérés dans vue.rs, quand le champ a le focus.

pub mod etat;
pub mod vue;

pub use etat::AppCalc;

use eframe::egui;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement l’entrée (comme le bouton "C")
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.clear_entree();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
