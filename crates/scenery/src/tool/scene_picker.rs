use eframe::egui;

/// First screen: asks for the directory a scene is loaded from.
pub struct ScenePicker {
    directory: String,
    error: Option<String>,
}

impl ScenePicker {
    pub fn new(directory: Option<String>) -> Self {
        Self {
            directory: directory.unwrap_or_default(),
            error: None,
        }
    }

    pub fn set_error(&mut self, error: &anyhow::Error) {
        self.error = Some(format!("{error:#}"));
    }

    /// Returns the chosen directory once the user asks to view it.
    pub fn draw(&mut self, ui: &mut egui::Ui) -> Option<String> {
        let mut submitted = false;
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Select a directory to view its scene");
            ui.label("The directory must contain an index.json describing the scene, plus every .obj, .mtl and texture file it references.");
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                let field = ui.add(
                    egui::TextEdit::singleline(&mut self.directory)
                        .hint_text("path/to/scene")
                        .desired_width(420.0),
                );
                let entered = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let has_directory = !self.directory.trim().is_empty();
                let clicked = ui.add_enabled(has_directory, egui::Button::new("View scene")).clicked();
                submitted = has_directory && (clicked || entered);
            });

            if let Some(error) = &self.error {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }
        });

        if !submitted {
            return None;
        }
        self.error = None;
        Some(self.directory.trim().to_string())
    }
}
