use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use super::appointment::Appointment;
use super::enums::AppointmentStatus;

/// Client-side narrowing over `List()`. Empty filter matches everything.
#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub patient_phone: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn for_patient(phone: &str) -> Self {
        Self {
            patient_phone: Some(phone.to_string()),
            ..Self::default()
        }
    }

    pub fn for_doctor(doctor_id: &str) -> Self {
        Self {
            doctor_id: Some(doctor_id.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, appt: &Appointment) -> bool {
        if let Some(phone) = &self.patient_phone {
            if appt.patient_phone.trim() != phone.trim() {
                return false;
            }
        }
        if let Some(doctor_id) = &self.doctor_id {
            if &appt.doctor_id != doctor_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if appt.status != status {
                return false;
            }
        }
        true
    }

    /// Keep matching records, newest appointment date first.
    pub fn apply(&self, appointments: Vec<Appointment>) -> Vec<Appointment> {
        let mut matched: Vec<Appointment> =
            appointments.into_iter().filter(|a| self.matches(a)).collect();
        sort_by_date_desc(&mut matched);
        matched
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Newest date first. Unparseable dates sink to the end; the sort is
/// stable so ties keep storage order.
pub fn sort_by_date_desc(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| {
        match (parse_date(&a.appointment_date), parse_date(&b.appointment_date)) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Counters for the admin overview.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub completed: usize,
}

impl AppointmentStats {
    pub fn from_appointments(appointments: &[Appointment]) -> Self {
        let mut stats = Self {
            total: appointments.len(),
            ..Self::default()
        };
        for appt in appointments {
            match appt.status {
                AppointmentStatus::Pending => stats.pending += 1,
                AppointmentStatus::Confirmed => stats.confirmed += 1,
                AppointmentStatus::Cancelled => stats.cancelled += 1,
                AppointmentStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }
}

/// Plain-text history fed to the assistant, one line per appointment.
pub fn history_summary(appointments: &[Appointment]) -> String {
    appointments
        .iter()
        .map(|a| {
            format!(
                "- Date: {}, Doctor: {}, Problem: {}, Notes: {}, Status: {}",
                a.appointment_date,
                a.doctor_name,
                a.patient_problem,
                a.doctor_notes.as_deref().filter(|n| !n.is_empty()).unwrap_or("N/A"),
                a.effective_health_status(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appt(id: &str, phone: &str, doctor: &str, date: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.into(),
            patient_name: "Jane Doe".into(),
            patient_phone: phone.into(),
            patient_problem: "headache".into(),
            doctor_id: doctor.into(),
            doctor_name: "Dr. James Wilson".into(),
            appointment_date: date.into(),
            appointment_time: "10:00 - 10:30".into(),
            status,
            created_at: Utc::now(),
            health_status: None,
            doctor_notes: None,
            chat_history: Vec::new(),
        }
    }

    #[test]
    fn empty_filter_keeps_all_sorted_desc() {
        let all = vec![
            appt("a", "1", "doc1", "2024-01-10", AppointmentStatus::Pending),
            appt("b", "1", "doc1", "2024-03-01", AppointmentStatus::Pending),
            appt("c", "1", "doc1", "someday", AppointmentStatus::Pending),
            appt("d", "1", "doc1", "2024-02-15", AppointmentStatus::Pending),
        ];
        let ids: Vec<_> = AppointmentFilter::default()
            .apply(all)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn filters_combine() {
        let all = vec![
            appt("a", "555", "doc1", "2024-01-10", AppointmentStatus::Pending),
            appt("b", "555", "doc2", "2024-01-11", AppointmentStatus::Confirmed),
            appt("c", "777", "doc2", "2024-01-12", AppointmentStatus::Confirmed),
        ];
        let filter = AppointmentFilter {
            patient_phone: Some("555".into()),
            doctor_id: Some("doc2".into()),
            status: Some(AppointmentStatus::Confirmed),
        };
        let result = filter.apply(all.clone());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "b");

        assert_eq!(AppointmentFilter::for_doctor("doc2").apply(all.clone()).len(), 2);
        assert_eq!(AppointmentFilter::for_patient("777").apply(all).len(), 1);
    }

    #[test]
    fn stats_count_each_status() {
        let all = vec![
            appt("a", "1", "doc1", "", AppointmentStatus::Pending),
            appt("b", "1", "doc1", "", AppointmentStatus::Pending),
            appt("c", "1", "doc1", "", AppointmentStatus::Confirmed),
            appt("d", "1", "doc1", "", AppointmentStatus::Completed),
        ];
        let stats = AppointmentStats::from_appointments(&all);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.cancelled, 0);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn history_summary_marks_missing_notes() {
        let mut first = appt("a", "1", "doc1", "2024-06-01", AppointmentStatus::Completed);
        first.doctor_notes = Some("Rest and fluids".into());
        first.health_status = Some(crate::models::HealthStatus::Good);
        let second = appt("b", "1", "doc1", "2024-07-01", AppointmentStatus::Pending);

        let summary = history_summary(&[first, second]);
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "- Date: 2024-06-01, Doctor: Dr. James Wilson, Problem: headache, Notes: Rest and fluids, Status: Good"
        );
        assert!(lines[1].contains("Notes: N/A"));
        assert!(lines[1].ends_with("Status: Fair"));
    }

    #[test]
    fn history_summary_empty_for_no_records() {
        assert_eq!(history_summary(&[]), "");
    }
}
