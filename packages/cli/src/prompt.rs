use common::Metadata;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use runner::{InputProvider, InputRequest, RunError};

/// Ask on the terminal for every metadata field left empty.
pub fn complete_metadata(mut metadata: Metadata) -> dialoguer::Result<Metadata> {
    let theme = ColorfulTheme::default();
    let fields: [(&str, &mut String); 6] = [
        ("Enter your name", &mut metadata.name),
        ("Enter subject name", &mut metadata.subject),
        ("Enter registration number", &mut metadata.reg_no),
        ("Enter group", &mut metadata.group),
        ("Enter semester", &mut metadata.semester),
        ("Enter experiment number", &mut metadata.experiment_no),
    ];
    for (prompt, value) in fields {
        if value.trim().is_empty() {
            *value = Input::<String>::with_theme(&theme)
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?;
        }
    }
    Ok(metadata)
}

/// Asks the person at the terminal for each value a program reads.
#[derive(Default)]
pub struct ConsoleInputs {
    theme: ColorfulTheme,
}

impl InputProvider for ConsoleInputs {
    fn provide(&mut self, request: &InputRequest<'_>) -> runner::Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(request.prompt_text())
            .allow_empty(true);
        if let InputRequest::Expected { input: expected, .. } = request {
            input = input.default(expected.kind.placeholder().to_string());
        }
        let value = input
            .interact_text()
            .map_err(|e| RunError::Input(e.to_string()))?;
        Ok((!value.is_empty()).then_some(value))
    }
}
