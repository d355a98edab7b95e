// Lock-free communication channels

use crate::messaging::command::Command;
use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;
    use ringbuf::traits::{Consumer, Producer};

    #[test]
    fn test_command_roundtrip() {
        let (mut tx, mut rx) = create_command_channel(8);
        tx.try_push(Command::Press(Pitch::C4)).unwrap();
        assert!(matches!(rx.try_pop(), Some(Command::Press(Pitch::C4))));
        assert!(rx.try_pop().is_none());
    }
}
