use chrono::{Duration, NaiveTime};
use serde::Serialize;

/// A doctor on the hospital roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: &'static str,
    pub name: &'static str,
    pub specialization: &'static str,
    pub experience_years: u32,
    pub availability: &'static str,
    pub rating: f32,
    pub image: &'static str,
    pub username: &'static str,
}

pub const DOCTORS: &[Doctor] = &[
    Doctor {
        id: "doc1",
        name: "Dr. Sarah Mitchell",
        specialization: "Cardiologist",
        experience_years: 12,
        availability: "Mon - Fri, 9 AM - 5 PM",
        rating: 4.9,
        image: "https://picsum.photos/seed/sarah/200/200",
        username: "sarah",
    },
    Doctor {
        id: "doc2",
        name: "Dr. James Wilson",
        specialization: "Neurologist",
        experience_years: 15,
        availability: "Mon - Thu, 10 AM - 4 PM",
        rating: 4.8,
        image: "https://picsum.photos/seed/james/200/200",
        username: "james",
    },
    Doctor {
        id: "doc3",
        name: "Dr. Elena Rodriguez",
        specialization: "Pediatrician",
        experience_years: 8,
        availability: "Tue - Sat, 8 AM - 3 PM",
        rating: 4.7,
        image: "https://picsum.photos/seed/elena/200/200",
        username: "elena",
    },
];

pub fn find_doctor(id: &str) -> Option<&'static Doctor> {
    DOCTORS.iter().find(|d| d.id == id)
}

/// Case-insensitive username lookup used by the doctor portal.
pub fn find_doctor_by_username(username: &str) -> Option<&'static Doctor> {
    let wanted = username.trim();
    DOCTORS
        .iter()
        .find(|d| d.username.eq_ignore_ascii_case(wanted))
}

const SLOT_MINUTES: i64 = 30;

/// Bookable windows: 30 minutes each, 10:00 up to 22:00.
pub fn time_slots() -> Vec<String> {
    let (Some(mut current), Some(end)) = (
        NaiveTime::from_hms_opt(10, 0, 0),
        NaiveTime::from_hms_opt(22, 0, 0),
    ) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    while current < end {
        let next = current + Duration::minutes(SLOT_MINUTES);
        slots.push(format!(
            "{} - {}",
            current.format("%H:%M"),
            next.format("%H:%M")
        ));
        current = next;
    }
    slots
}
