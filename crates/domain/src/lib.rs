mod appointment;
mod notification;
mod reminder;
mod shared;

pub use appointment::{Appointment, AppointmentStatus};
pub use notification::{Notification, NotificationType};
pub use reminder::{ReminderKind, MILLIS_PER_HOUR};
pub use shared::entity::{Entity, InvalidIDError, ID};
