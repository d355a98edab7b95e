// Messaging module - commands toward audio, notifications toward UI

pub mod channels;
pub mod command;
pub mod notification;

pub use channels::{
    CommandConsumer, CommandProducer, NotificationConsumer, NotificationProducer,
    create_command_channel, create_notification_channel,
};
pub use command::Command;
pub use notification::{Notification, NotificationCategory, NotificationLevel};
