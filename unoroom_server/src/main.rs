mod remote_player;

use std::{
    error::Error,
    net::{SocketAddr, UdpSocket},
    time::{Duration, Instant, SystemTime},
};

use clap::Parser;
use log::{info, warn};
use renet::{
    transport::{NetcodeServerTransport, ServerAuthentication, ServerConfig},
    ConnectionConfig, DefaultChannel, RenetServer, ServerEvent,
};
use tokio::{sync::mpsc::unbounded_channel, time};
use unoroom_core::{
    config::SessionConfig,
    event::PeerAction,
    game_lobby::{Lifecycle, Session},
    host::Host,
    player::{PeerId, PlayerInterface},
    random_playing_computer::RandomPlayingComputer,
    relay::Loopback,
    room::RoomCode,
    user_name::Username,
};

use crate::remote_player::{Outgoing, RemotePlayer};

/// Seat of the hosting process itself. Remote peers use their client id.
const HOST_ID: PeerId = PeerId(0);

#[derive(Parser, Debug)]
#[command(version, about = "Hosts one Uno room over UDP")]
struct Args {
    /// UDP port to listen on
    #[arg(short, long, default_value_t = 6969)]
    port: u16,
    #[arg(long, default_value_t = 4)]
    max_players: usize,
    /// Seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,
    /// Display name of the host's own seat
    #[arg(long, default_value = "Host")]
    name: String,
    /// Room code; a random one is generated when omitted
    #[arg(long)]
    room: Option<RoomCode>,
}

/// Whether the lobby countdown started between two frames.
fn countdown_began(before: Lifecycle, after: Lifecycle) -> bool {
    matches!(after, Lifecycle::Countdown { .. }) && !matches!(before, Lifecycle::Countdown { .. })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let room = args
        .room
        .unwrap_or_else(|| RoomCode::generate(&mut rand::thread_rng()));
    let public_addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let mut server = RenetServer::new(ConnectionConfig::default());
    let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
    let server_config = ServerConfig {
        current_time,
        max_clients: args.max_players.saturating_sub(1),
        protocol_id: room.protocol_id(),
        public_addresses: vec![public_addr],
        authentication: ServerAuthentication::Unsecure,
    };
    let socket = UdpSocket::bind(public_addr)?;
    let mut transport = NetcodeServerTransport::new(server_config, socket)?;

    let config = SessionConfig::with_max_players(args.max_players);
    let session = match args.seed {
        Some(seed) => Session::seeded(config, seed),
        None => Session::new(config),
    };
    let mut seat = match args.seed {
        Some(seed) => RandomPlayingComputer::seeded(args.name.clone(), seed),
        None => RandomPlayingComputer::new(args.name.clone()),
    };
    let local = Loopback::new(HOST_ID);
    let local_view = local.view();
    let mut host = Host::new(session, HOST_ID, seat.name().to_string(), Box::new(local))?;

    let (outbox, mut outgoing) = unbounded_channel::<Outgoing>();
    let mut frame = time::interval(Duration::from_millis(50));
    let mut countdown = time::interval(Duration::from_secs(1));
    let mut lifecycle = host.lifecycle();
    let mut last_updated = Instant::now();
    info!("room {} listening on {}", room.endpoint(), public_addr);
    println!("Room code: {room}");

    loop {
        tokio::select! {
            _ = frame.tick() => {}
            _ = countdown.tick() => host.tick(),
        }

        let now = Instant::now();
        let duration = now - last_updated;
        last_updated = now;
        server.update(duration);
        if let Err(err) = transport.update(duration, &mut server) {
            warn!("transport error: {}", err);
        }

        while let Some(event) = server.get_event() {
            match event {
                ServerEvent::ClientConnected { client_id } => {
                    let name = transport
                        .user_data(client_id)
                        .map(|data| Username::from_user_data(&data));
                    info!(
                        "client {} connected as {:?}",
                        client_id,
                        name.as_ref().map(Username::as_str)
                    );
                    host.connect(
                        PeerId(client_id.raw()),
                        Box::new(RemotePlayer::new(client_id, outbox.clone())),
                    );
                }
                ServerEvent::ClientDisconnected { client_id, reason } => {
                    info!("client {} disconnected: {}", client_id, reason);
                    host.disconnect(PeerId(client_id.raw()));
                }
            }
        }

        for client_id in server.clients_id() {
            while let Some(message) =
                server.receive_message(client_id, DefaultChannel::ReliableOrdered)
            {
                match serde_json::from_slice::<PeerAction>(&message) {
                    // rejections are answered inside the host
                    Ok(action) => {
                        let _ = host.handle(PeerId(client_id.raw()), action);
                    }
                    Err(err) => warn!("malformed message from {}: {}", client_id, err),
                }
            }
        }

        // a fresh countdown gets a full second before its first tick
        if countdown_began(lifecycle, host.lifecycle()) {
            countdown.reset();
        }
        lifecycle = host.lifecycle();

        // one action per frame for the host's own seat
        let view = local_view.borrow().clone();
        if view.is_my_turn() {
            if let Some(action) = seat.obtain_action(&view) {
                let _ = host.submit(action);
            }
        }

        while let Ok((client_id, text)) = outgoing.try_recv() {
            server.send_message(client_id, DefaultChannel::ReliableOrdered, text);
        }
        transport.send_packets(&mut server);

        if let Lifecycle::Ended { winner } = host.lifecycle() {
            match winner.and_then(|id| host.session().table().player(id)) {
                Some(player) => println!("{} wins!", player.name),
                None => println!("Round over."),
            }
            server.disconnect_all();
            transport.send_packets(&mut server);
            return Ok(());
        }
    }
}
