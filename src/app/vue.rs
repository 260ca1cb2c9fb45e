// src/app/vue.rs
//
// Vue (UI egui), natif + web
// ---------------------------
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter évalue, Backspace efface un nom de fonction d’un coup (champ focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - Feuille : chaque ligne évaluée reste visible ; clic sur un résultat = reprise
//
// Note : PAS de Key::NumEnter (n’existe pas dans egui 0.33.x).

use eframe::egui;

use papier_calcul::noyau::{evaluate_expression, format_jetons, tokenize};

use super::etat::{AppCalc, PRECISION_MAX_UI};

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Papier de calcul");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultat(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_feuille(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Entrée :");

        let avant = self.entree.clone();
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 2+3*4, √(2)^2, sin(π/6), 20!, 1.5E-3÷7")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.eval_via_noyau();
        }

        // TextEdit a déjà appliqué l’effacement : comparaison avec le texte d’avant
        let backspace = ui.input(|i| i.key_pressed(egui::Key::Backspace));
        if resp.has_focus() && backspace && resp.changed() {
            self.completer_effacement(&avant);
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // C = entrée seulement ; CLR = résultat seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "CLR", "Efface résultat + erreur + jetons", Action::ClearResultats);
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();

            ui.label("Précision :");
            let mut p = self.precision;
            let resp = ui.add(
                egui::DragValue::new(&mut p)
                    .speed(1)
                    .range(1..=PRECISION_MAX_UI)
                    .suffix(" chiffres"),
            );
            if resp.changed() {
                self.set_precision(p);
            }
        });

        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::Brut);
            self.bouton_insert(ui, ")", ")", InsertKind::Brut);

            for op in ["+", "-", "*", "÷", "^", "!"] {
                self.bouton_insert(ui, op, op, InsertKind::Brut);
            }

            ui.separator();

            self.bouton_insert(ui, "π", "π", InsertKind::Brut);
            self.bouton_insert(ui, "e", "e", InsertKind::Constante);
            self.bouton_insert(ui, "EE", "E", InsertKind::Brut);

            ui.add_space(10.0);

            let eq = ui.add_sized([64.0, 32.0], egui::Button::new("="));
            if eq.clicked() {
                self.eval_via_noyau();
            }
        });

        ui.horizontal_wrapped(|ui| {
            for f in [
                "sin", "cos", "tan", "arcsin", "arccos", "arctan", "sinh", "cosh", "tanh", "√",
                "log", "ln", "exp",
            ] {
                self.bouton_insert(ui, f, &format!("{f}("), InsertKind::Brut);
            }
        });

        ui.add_space(8.0);

        self.ui_pave_numerique(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique_papier")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for rangee in [["7", "8", "9"], ["4", "5", "6"], ["1", "2", "3"]] {
                    for chiffre in rangee {
                        self.bouton_insert(ui, chiffre, chiffre, InsertKind::Brut);
                    }
                    match rangee[0] {
                        "7" => self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace),
                        "4" => self.bouton_insert(ui, "/", "/", InsertKind::Brut),
                        _ => self.bouton_insert(ui, ".", ".", InsertKind::Brut),
                    }
                    ui.end_row();
                }

                self.bouton_insert(ui, "0", "0", InsertKind::Brut);
                ui.label("");
                ui.label("");
                ui.label("");
                ui.end_row();
            });
    }

    fn ui_resultat(&mut self, ui: &mut egui::Ui) {
        ui.label(format!("Résultat ({} chiffres) :", self.precision));
        Self::champ_monospace(ui, "resultat_out", &self.resultat, 2);

        egui::CollapsingHeader::new("Jetons")
            .default_open(false)
            .show(ui, |ui| {
                Self::champ_monospace(ui, "jetons_out", &self.jetons, 1);
            });
    }

    fn ui_feuille(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Feuille ({} lignes) :", self.feuille.len()));
            if ui.button("Vider").clicked() {
                self.vider_feuille();
            }
        });

        let mut reprise = None;
        egui::Grid::new("feuille_papier")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (k, ligne) in self.feuille.iter().enumerate().rev() {
                    ui.monospace(format!("= {}", ligne.expression));
                    let resp = ui
                        .add(egui::Button::new(egui::RichText::new(&ligne.resultat).monospace()))
                        .on_hover_text(format!("{} chiffres, clic : reprendre", ligne.precision));
                    if resp.clicked() {
                        reprise = Some(k);
                    }
                    ui.end_row();
                }
            });

        if let Some(k) = reprise {
            self.reprendre(k);
        }
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.add(egui::Label::new(egui::RichText::new(contenu).monospace()).wrap());
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Backspace => self.backspace_entree(),
            }
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if !resp.clicked() {
            return;
        }

        match kind {
            InsertKind::Brut => self.entree.push_str(to_insert),
            InsertKind::Constante => {
                // "2e" serait lu comme 2 suivi de e ; "2e5" comme un exposant :
                // après un chiffre on sépare par '*'
                if self.entree.ends_with(|c: char| c.is_ascii_digit()) {
                    self.entree.push('*');
                }
                self.entree.push_str(to_insert);
            }
        }

        self.focus_entree = true;
    }

    /// Évalue l’entrée via le noyau, dépose résultat + trace dans l’état UI.
    fn eval_via_noyau(&mut self) {
        let s = self.entree.trim().to_string();

        self.jetons = match tokenize(s.strip_prefix('=').unwrap_or(&s)) {
            Ok(t) => format_jetons(&t),
            Err(e) => e.to_string(),
        };

        match evaluate_expression(&s, self.precision) {
            Ok(resultat) => self.set_resultat(&s, resultat),
            Err(e) => self.set_erreur(format!("{} : {e}", e.code())),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Brut,
    Constante,
}
