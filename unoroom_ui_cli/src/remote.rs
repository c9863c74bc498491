use std::{
    error::Error,
    io::{self, BufRead},
    net::{SocketAddr, UdpSocket},
    sync::mpsc::{channel, Receiver},
    thread,
    time::{Duration, Instant, SystemTime},
};

use log::{debug, warn};
use renet::{
    transport::{ClientAuthentication, NetcodeClientTransport},
    ConnectionConfig, DefaultChannel, RenetClient,
};
use unoroom_core::{
    event::{HostEvent, PeerAction},
    player::{PeerId, PlayerInterface},
    room::RoomCode,
    user_name::Username,
    view::PeerView,
};

use crate::cli_player::{CliPlayer, Reply};

/// Reads stdin on its own thread so the network loop never blocks on input.
fn spawn_stdin() -> Receiver<String> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn send(client: &mut RenetClient, action: &PeerAction) -> Result<(), serde_json::Error> {
    let text = serde_json::to_string(action)?;
    debug!("sending {}", text);
    client.send_message(DefaultChannel::ReliableOrdered, text.into_bytes());
    Ok(())
}

/// Takes a seat in a room hosted elsewhere and plays until the round ends.
pub fn join(server_addr: SocketAddr, room: RoomCode, player: CliPlayer) -> Result<(), Box<dyn Error>> {
    let username = Username::from_string(player.name().to_string());
    let mut client = RenetClient::new(ConnectionConfig::default());
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let client_id = current_time.as_millis() as u64;
    let authentication = ClientAuthentication::Unsecure {
        server_addr,
        client_id,
        user_data: Some(username.to_netcode_user_data()),
        protocol_id: room.protocol_id(),
    };
    let mut transport = NetcodeClientTransport::new(current_time, authentication, socket)?;

    let mut view = PeerView::new(PeerId(client_id));
    let lines = spawn_stdin();
    let mut joined = false;
    let mut prompted = false;
    let mut last_updated = Instant::now();
    println!("Joining {} at {}...", room.endpoint(), server_addr);

    loop {
        let now = Instant::now();
        let duration = now - last_updated;
        last_updated = now;
        client.update(duration);
        transport.update(duration, &mut client)?;

        if client.is_disconnected() {
            return Err(format!("lost connection to {}", room.endpoint()).into());
        }

        if client.is_connected() {
            if !joined {
                send(
                    &mut client,
                    &PeerAction::JoinRoom {
                        player_name: username.as_str().to_string(),
                    },
                )?;
                joined = true;
            }

            let mut changed = false;
            while let Some(message) = client.receive_message(DefaultChannel::ReliableOrdered) {
                match serde_json::from_slice::<HostEvent>(&message) {
                    Ok(event) => {
                        view.apply(&event);
                        changed = true;
                    }
                    Err(err) => warn!("malformed message from the host: {}", err),
                }
            }
            if changed {
                player.notify(&view);
                prompted = false;
            }
            if view.finished {
                break;
            }
            if view.is_my_turn() && !prompted {
                player.prompt(&view);
                prompted = true;
            }

            while let Ok(line) = lines.try_recv() {
                match player.interpret(&line, &view) {
                    Reply::Send(action) => send(&mut client, &action)?,
                    Reply::Leave => {
                        transport.disconnect();
                        return Ok(());
                    }
                    Reply::Nothing => prompted = false,
                }
            }
        }

        transport.send_packets(&mut client)?;
        thread::sleep(Duration::from_millis(50));
    }

    transport.disconnect();
    Ok(())
}
