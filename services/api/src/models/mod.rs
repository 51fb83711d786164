//! Data models for the workshop registration portal

pub mod registration;
pub mod testimonial;
pub mod user;
pub mod workshop;

pub use registration::{
    NewRegistration, PaymentStatus, Registration, RegistrationStatus, UpdateRegistration,
};
pub use testimonial::{NewTestimonial, Testimonial, TestimonialRole, UpdateTestimonial};
pub use user::{AdminUpdateUser, LoginCredentials, NewUser, Role, UpdateUser, User};
pub use workshop::{NewWorkshop, UpdateWorkshop, Workshop, WorkshopQuery, WorkshopStatus};
