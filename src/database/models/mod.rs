pub mod appointment;
pub mod business;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus, CustomerData};
pub use business::{
    AppointmentConfig, AvailabilityDay, Business, PublicBusiness, ServiceItem, TimeSlot,
    VisualConfig,
};
pub use user::User;
