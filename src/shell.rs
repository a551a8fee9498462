/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::{Game, Nag, ShellCommand};

/// An interactive session over one [`Game`].
///
/// Commands arrive over a channel, either from [`Shell::send_command`] or from the thread that
/// reads `stdin` once [`Shell::run`] starts.
#[derive(Debug)]
pub struct Shell {
    game: Game,

    /// One half of a channel, responsible for sending commands to the shell to execute.
    sender: Sender<ShellCommand>,

    /// One half of a channel, responsible for receiving commands for the shell to execute.
    receiver: Receiver<ShellCommand>,
}

impl Shell {
    /// Constructs a new [`Shell`] over `game`.
    pub fn new(game: Game) -> Self {
        let (sender, receiver) = channel();
        Self {
            game,
            sender,
            receiver,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Sends a [`ShellCommand`] to the shell to be executed.
    pub fn send_command(&self, command: ShellCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Failed to send command to shell")
    }

    /// Execute the main event loop of the shell.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                debug!("input handler stopped: {err}");
            }
        });
        self.drain()
    }

    /// Executes every queued command until `exit` or until all senders are gone.
    fn drain(&mut self) -> Result<()> {
        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, ShellCommand::Exit) {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e}");
            }
        }
        Ok(())
    }

    /// Executes a single command, printing its output.
    pub fn execute(&mut self, cmd: ShellCommand) -> Result<()> {
        match cmd {
            ShellCommand::Display => println!("{}", self.game),

            ShellCommand::Fen => println!("{}", self.game.fen()),

            ShellCommand::Moves { square } => {
                let from = square
                    .map(|name| self.game.board().parse_square(&name))
                    .transpose()?;
                let moves = self
                    .game
                    .moves()
                    .iter()
                    .filter(|mv| from.map_or(true, |from| mv.from() == from))
                    .map(|mv| mv.to_string())
                    .collect::<Vec<_>>();

                if moves.is_empty() {
                    println!("(none)");
                } else {
                    println!("{}", moves.join(", "));
                }
            }

            ShellCommand::Move { mv } => {
                let mv = self.game.make_move(mv.as_str())?;
                println!("{mv}");
                self.announce();
            }

            ShellCommand::Promote { piece } => {
                let mv = self.game.promote(&piece)?;
                println!("{mv}");
                self.announce();
            }

            ShellCommand::Undo => {
                if !self.game.undo() {
                    bail!("Nothing to undo");
                }
            }

            ShellCommand::Redo => {
                if !self.game.redo() {
                    bail!("Nothing to redo");
                }
            }

            ShellCommand::Goto { ply } => {
                if !self.game.goto(ply) {
                    bail!("No ply with id {ply}");
                }
            }

            ShellCommand::Draw { color } => {
                self.game.draw(color)?;
                self.announce();
            }

            ShellCommand::Resign { color } => {
                self.game.resign(color)?;
                self.announce();
            }

            ShellCommand::Forfeit { color } => {
                self.game.forfeit(color)?;
                self.announce();
            }

            ShellCommand::Flag => {
                self.game.flag_fall()?;
                self.announce();
            }

            ShellCommand::Nag { value } => self.game.nag(value.parse::<Nag>()?)?,

            ShellCommand::Comment { text } => self.game.comment(text.join(" "))?,

            ShellCommand::Pgn => println!("{}", self.game.to_pgn()?),

            ShellCommand::Perft { depth } => println!("{}", self.game.perft(depth)),

            ShellCommand::Splitperft { depth } => {
                let nodes = self.game.splitperft(depth);
                println!("\n{nodes}");
            }

            ShellCommand::Trace { square, limit } => {
                let square = self.game.board().parse_square(&square)?;
                if !self.game.position().has(square) {
                    bail!("No piece on {}", square.name());
                }
                let trace = self.game.trace_moves(square, None);
                println!("{}", trace.text(limit));
            }

            ShellCommand::Stats => println!("{:#?}", self.game.stats()),

            ShellCommand::Exit => {}
        }

        Ok(())
    }

    /// Prints the outcome once the game is over.
    fn announce(&self) {
        if self.game.is_game_over() {
            println!("{} ({})", self.game.result().pgn(), self.game.reason());
        } else if self.game.is_promotion() {
            println!("promote to?");
        }
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through
/// the supplied `sender`.
fn input_handler(sender: Sender<ShellCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing shell commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(ShellCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Shell received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<ShellCommand>() {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to shell")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => {
                warn!("rejected input {buf:?}");
                eprintln!("{err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, GameResult};

    fn run(shell: &mut Shell, commands: &[&str]) {
        for cmd in commands {
            shell.send_command(cmd.parse().unwrap()).unwrap();
        }
        shell.send_command(ShellCommand::Exit).unwrap();
        shell.drain().unwrap();
    }

    #[test]
    fn test_commands_drive_the_game() {
        let mut game = Game::default();
        game.play().unwrap();
        let mut shell = Shell::new(game);
        run(
            &mut shell,
            &["move e4", "move e5", "nag !", "comment main line", "undo", "move c5"],
        );
        assert_eq!(
            shell.game().fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2"
        );

        run(&mut shell, &["resign white", "move Nf3"]);
        assert_eq!(shell.game().result(), GameResult::Resignation(Color::Black));
    }

    #[test]
    fn test_failed_commands_keep_the_loop_running() {
        let mut game = Game::default();
        game.play().unwrap();
        let mut shell = Shell::new(game);
        run(&mut shell, &["move e5", "redo", "goto 9", "move d4"]);
        assert_eq!(shell.game().ply_id(), Some(1));
        assert!(shell.execute(ShellCommand::Undo).is_ok());
        assert!(shell.execute(ShellCommand::Undo).is_err());
    }
}
