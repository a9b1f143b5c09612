use crate::events::{LapCompleted, RaceFinished};
use crate::resources::{Notification, Notifications};
use bevy::prelude::*;

/// Turn lap and finish events into `{title, description}` records for the
/// sink. Presentation happens elsewhere.
pub fn race_notification_system(
    mut lap_events: EventReader<LapCompleted>,
    mut finish_events: EventReader<RaceFinished>,
    mut notifications: ResMut<Notifications>,
) {
    for event in lap_events.read() {
        notifications.push(Notification {
            title: format!("Lap {} complete", event.lap),
            description: format!("{:.1}s elapsed", event.elapsed_secs),
        });
    }

    for event in finish_events.read() {
        notifications.push(Notification {
            title: "Race finished".to_string(),
            description: format!(
                "P{} after {} laps in {:.1}s",
                event.result.placement, event.result.laps, event.result.elapsed_secs
            ),
        });
    }
}

// Stand-in for the toast overlay, which lives outside this core.
pub fn drain_notifications_system(mut notifications: ResMut<Notifications>) {
    while let Some(notification) = notifications.pop() {
        info!("{}: {}", notification.title, notification.description);
    }
}
