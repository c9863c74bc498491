use std::{error::Error, net::SocketAddr};

use clap::{Parser, Subcommand};
use cli_player::CliPlayer;
use unoroom_core::{room::RoomCode, run_game};

mod cli_player;
mod remote;

#[derive(Parser, Debug)]
#[command(version, about = "Uno in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play against computer players on this machine (default)
    Local {
        #[arg(short, long, default_value_t = 3)]
        computers: usize,
        /// Seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Join a room hosted by unoroom_server
    Join {
        addr: SocketAddr,
        room: RoomCode,
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let command = Cli::parse().command.unwrap_or(Command::Local {
        computers: 3,
        seed: None,
    });

    match command {
        Command::Local { computers, seed } => {
            run_game(CliPlayer::new, computers, seed)?;
        }
        Command::Join { addr, room, name } => {
            let player = name.map_or_else(CliPlayer::new, CliPlayer::named);
            remote::join(addr, room, player)?;
        }
    }
    Ok(())
}
