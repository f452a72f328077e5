//! Turns session events into lines for the terminal.

use murmur::prelude::*;

/// Formats one event for display.
pub fn render(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Authenticated { message } => message.clone(),
        SessionEvent::LoginFailed { message, .. } => message.clone(),
        SessionEvent::CommandResult {
            command, message, ..
        } => format!("{command}: {message}"),
        SessionEvent::IncomingWhisper { sender, message } => {
            format!("[From {sender}] : {message}")
        }
        SessionEvent::FrameDiscarded { reason } => {
            format!("(ignored a bad message from the server: {reason})")
        }
        SessionEvent::ConnectionLost { reason } => {
            format!("Connection lost: {reason}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_incoming_whisper() {
        let event = SessionEvent::IncomingWhisper {
            sender: "bob".into(),
            message: "hi".into(),
        };
        assert_eq!(render(&event), "[From bob] : hi");
    }

    #[test]
    fn test_render_command_result_names_command() {
        let event = SessionEvent::CommandResult {
            command: Command::Whisper,
            code: ReturnCode(3),
            message: "Failed to whisper".into(),
        };
        assert_eq!(render(&event), "whisper: Failed to whisper");
    }

    #[test]
    fn test_render_login_outcomes_show_table_text() {
        let ok = SessionEvent::Authenticated {
            message: "Action successful".into(),
        };
        let failed = SessionEvent::LoginFailed {
            code: ReturnCode(1),
            message: "Failed to login".into(),
        };
        assert_eq!(render(&ok), "Action successful");
        assert_eq!(render(&failed), "Failed to login");
    }
}
