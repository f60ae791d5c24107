// Line-based terminal controls standing in for keyboard and touch input.
//
//   left | a       hold left (releases right)
//   right | d      hold right (releases left)
//   stop | s       release both directions
//   fire | f       tap the fire key
//   hold | touch   press the touch fire button
//   release        lift the touch fire button
//   quit | q       leave the game

use crate::use_cases::{Button, InputCommand, Key};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Maps one line to the input commands it stands for. Unknown lines yield `None`.
pub fn parse_command(line: &str) -> Option<Vec<InputCommand>> {
    use InputCommand::*;

    let commands = match line.trim().to_ascii_lowercase().as_str() {
        "left" | "a" => vec![KeyUp(Key::Right), KeyDown(Key::Left)],
        "right" | "d" => vec![KeyUp(Key::Left), KeyDown(Key::Right)],
        "stop" | "s" => vec![KeyUp(Key::Left), KeyUp(Key::Right)],
        "fire" | "f" | "space" => vec![KeyDown(Key::Space), KeyUp(Key::Space)],
        "hold" | "touch" => vec![PointerDown(Button::Shoot)],
        "release" => vec![PointerUp(Button::Shoot)],
        "quit" | "q" => vec![Quit],
        _ => return None,
    };
    Some(commands)
}

/// Forwards parsed commands until input ends, `quit` is read, or the receiver goes away.
/// End of input counts as quitting.
pub async fn stdin_reader<R>(mut lines: Lines<R>, tx: mpsc::Sender<InputCommand>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read input");
                break;
            }
        };

        let Some(commands) = parse_command(&line) else {
            if !line.trim().is_empty() {
                warn!(input = %line.trim(), "unknown command");
            }
            continue;
        };

        for command in commands {
            if tx.send(command).await.is_err() {
                return;
            }
            if command == InputCommand::Quit {
                return;
            }
        }
    }

    debug!("input closed");
    let _ = tx.send(InputCommand::Quit).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn when_fire_is_typed_then_key_is_tapped() {
        assert_eq!(
            parse_command(" FIRE "),
            Some(vec![
                InputCommand::KeyDown(Key::Space),
                InputCommand::KeyUp(Key::Space)
            ])
        );
    }

    #[test]
    fn when_direction_changes_then_opposite_key_is_released() {
        assert_eq!(
            parse_command("a"),
            Some(vec![
                InputCommand::KeyUp(Key::Right),
                InputCommand::KeyDown(Key::Left)
            ])
        );
    }

    #[test]
    fn when_line_is_unknown_then_nothing_is_parsed() {
        assert_eq!(parse_command("jump"), None);
    }

    #[tokio::test]
    async fn when_input_ends_then_quit_is_sent() {
        let input: &[u8] = b"hold\nnonsense\n";
        let (tx, mut rx) = mpsc::channel(8);

        stdin_reader(BufReader::new(input).lines(), tx).await;

        assert_eq!(rx.recv().await, Some(InputCommand::PointerDown(Button::Shoot)));
        assert_eq!(rx.recv().await, Some(InputCommand::Quit));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn when_quit_is_read_then_remaining_lines_are_ignored() {
        let input: &[u8] = b"q\nfire\n";
        let (tx, mut rx) = mpsc::channel(8);

        stdin_reader(BufReader::new(input).lines(), tx).await;

        assert_eq!(rx.recv().await, Some(InputCommand::Quit));
        assert_eq!(rx.recv().await, None);
    }
}
