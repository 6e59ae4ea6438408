use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

use crate::{app::App, error::Result, ui};

/// Render the page once into an off-screen buffer and return it as text.
pub fn render_to_string(app: &App, width: u16, height: u16) -> Result<String> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;

    terminal.draw(|frame| {
        ui::draw(frame, app);
    })?;

    Ok(buffer_to_string(terminal.backend().buffer()))
}

pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut result = String::new();

    for y in 0..buffer.area().height {
        let mut line = String::new();
        for x in 0..buffer.area().width {
            let sym = buffer[(x, y)].symbol();
            if sym.is_empty() {
                line.push(' ');
            } else {
                line.push_str(sym);
            }
        }
        result.push_str(line.trim_end());
        result.push('\n');
    }

    result
}
