use crate::components::{Heading, PlayerControlled};
use crate::events::RaceFinished;
use crate::race::RaceSession;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;
use serde::{Deserialize, Serialize};
use std::env;
use std::io::{self, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:4000";
const POSITION_INTERVAL: Duration = Duration::from_millis(50);

/// Outbound payloads, one JSON object per line.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ChannelMessage {
    Position {
        x: f32,
        y: f32,
        heading: f32,
        speed: f32,
    },
    RaceFinish {
        elapsed_secs: f32,
    },
}

/// Connection to the real-time relay. Everything here is fire-and-forget:
/// no acknowledgements, no retries, and a dead or absent relay never
/// stalls the frame.
#[derive(Resource)]
pub struct ChannelClient {
    stream: Option<TcpStream>,
    connection_attempted: bool,
    last_position_send: Option<Instant>,
}

impl Default for ChannelClient {
    fn default() -> Self {
        Self {
            stream: None,
            connection_attempted: false,
            last_position_send: None,
        }
    }
}

impl ChannelClient {
    pub fn emit(&mut self, message: &ChannelMessage) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        let Ok(mut line) = serde_json::to_string(message) else {
            return;
        };
        line.push('\n');

        match stream.write_all(line.as_bytes()) {
            Ok(()) => {}
            // Socket buffer full: the message is dropped, the relay can
            // catch up from the next one.
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(_) => {
                self.stream = None;
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// One connection attempt at startup. No relay is not an error.
pub fn connect_channel_system(mut client: ResMut<ChannelClient>) {
    if client.connection_attempted {
        return;
    }
    client.connection_attempted = true;

    let address = env::var("SLIPSTREAM_RELAY").unwrap_or_else(|_| DEFAULT_RELAY_ADDR.to_string());
    match TcpStream::connect(&address) {
        Ok(stream) => {
            if stream.set_nonblocking(true).is_err() {
                return;
            }
            info!("Connected to relay at {}", address);
            client.stream = Some(stream);
        }
        Err(_) => {
            info!("No relay at {}, running offline", address);
        }
    }
}

pub fn broadcast_position_system(
    session: Res<RaceSession>,
    mut client: ResMut<ChannelClient>,
    query: Query<(&Transform, &Heading, &Velocity), With<PlayerControlled>>,
) {
    if !session.is_racing() || session.is_paused() || !client.is_connected() {
        return;
    }

    let due = client
        .last_position_send
        .map_or(true, |at| at.elapsed() >= POSITION_INTERVAL);
    if !due {
        return;
    }

    if let Ok((transform, heading, velocity)) = query.get_single() {
        client.last_position_send = Some(Instant::now());
        client.emit(&ChannelMessage::Position {
            x: transform.translation.x,
            y: transform.translation.y,
            heading: heading.angle,
            speed: velocity.linvel.length(),
        });
    }
}

pub fn broadcast_finish_system(
    mut finish_events: EventReader<RaceFinished>,
    mut client: ResMut<ChannelClient>,
) {
    for event in finish_events.read() {
        client.emit(&ChannelMessage::RaceFinish {
            elapsed_secs: event.result.elapsed_secs,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_payload_shape() {
        let message = ChannelMessage::Position {
            x: 1.0,
            y: 2.0,
            heading: 0.5,
            speed: 240.0,
        };
        let line = serde_json::to_string(&message).unwrap();

        assert!(line.contains("\"Position\""));
        assert!(line.contains("\"heading\":0.5"));
        assert!(line.contains("\"speed\":240.0"));
    }

    #[test]
    fn test_emit_without_a_connection_is_dropped() {
        let mut client = ChannelClient::default();
        client.emit(&ChannelMessage::RaceFinish { elapsed_secs: 95.2 });
        assert!(!client.is_connected());
    }
}
