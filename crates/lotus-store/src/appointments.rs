//! # Appointments & Technician Scheduling
//!
//! Booking lifecycle plus the technician double-booking guard.
//!
//! ## Scheduling Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              find_technician_conflict()                                 │
//! │                                                                         │
//! │  Candidate window: [start, start + duration) in minutes since midnight │
//! │                                                                         │
//! │  Scan all appointments, skipping:                                      │
//! │  ├── the excluded one (re-checking an edit against itself)             │
//! │  ├── other dates                                                       │
//! │  ├── cancelled bookings                                                │
//! │  └── bookings with no service assigned to this technician              │
//! │                                                                         │
//! │  Overlap is half-open:  new_start < apt_end  &&  new_end > apt_start   │
//! │  → back-to-back bookings (10:30 end, 10:30 start) do NOT collide       │
//! │                                                                         │
//! │  Linear scan: a single location books tens of visits per day, an       │
//! │  index would not pay for itself.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Completing an appointment consumes the package session tagged on each
//! service; cancelling a completed appointment returns them.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use lotus_core::{
    minutes_of, Appointment, AppointmentService, AppointmentStatus, CoreError, ValidationError,
    APPOINTMENT_CODE_DIGITS, APPOINTMENT_CODE_PREFIX,
};

use crate::error::{StoreError, StoreResult};
use crate::state::Store;

/// A detected double-booking, with enough context for the UI to show
/// which booking collides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianConflict {
    pub technician_id: String,
    pub appointment_id: String,
    pub appointment_code: String,
    pub start_minutes: u32,
    pub end_minutes: u32,
}

/// Input for booking or rebooking an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub customer_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub services: Vec<AppointmentService>,
    #[serde(default)]
    pub note: Option<String>,
}

impl AppointmentInput {
    fn validate(&self) -> StoreResult<()> {
        if self.end_time <= self.start_time {
            return Err(ValidationError::InvalidFormat {
                field: "end_time".to_string(),
                reason: "must be after start_time".to_string(),
            }
            .into());
        }
        if self.services.is_empty() {
            return Err(ValidationError::Required {
                field: "services".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn duration_minutes(&self) -> u32 {
        minutes_of(self.end_time) - minutes_of(self.start_time)
    }
}

impl Store {
    // -------------------------------------------------------------------------
    // Scheduling guard
    // -------------------------------------------------------------------------

    /// Scans for an overlapping, non-cancelled appointment of the
    /// technician on the date. Returns the first collision found, if any.
    pub fn find_technician_conflict(
        &self,
        technician_id: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
        exclude_appointment_id: Option<&str>,
    ) -> Option<TechnicianConflict> {
        let new_start = minutes_of(start_time);
        let new_end = new_start + duration_minutes;

        self.appointments
            .iter()
            .filter(|apt| Some(apt.id.as_str()) != exclude_appointment_id)
            .filter(|apt| apt.date == date)
            .filter(|apt| apt.status != AppointmentStatus::Cancelled)
            .filter(|apt| apt.involves_technician(technician_id))
            .find_map(|apt| {
                let (apt_start, apt_end) = apt.window_minutes();
                if new_start < apt_end && new_end > apt_start {
                    Some(TechnicianConflict {
                        technician_id: technician_id.to_string(),
                        appointment_id: apt.id.clone(),
                        appointment_code: apt.code.clone(),
                        start_minutes: apt_start,
                        end_minutes: apt_end,
                    })
                } else {
                    None
                }
            })
    }

    /// Boolean façade over [`Store::find_technician_conflict`].
    pub fn is_technician_busy(
        &self,
        technician_id: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
        exclude_appointment_id: Option<&str>,
    ) -> bool {
        self.find_technician_conflict(
            technician_id,
            date,
            start_time,
            duration_minutes,
            exclude_appointment_id,
        )
        .is_some()
    }

    /// Non-cancelled appointments of a technician on a date (any service
    /// assigned to them counts).
    pub fn technician_appointments(
        &self,
        technician_id: &str,
        date: NaiveDate,
    ) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|apt| apt.date == date)
            .filter(|apt| apt.status != AppointmentStatus::Cancelled)
            .filter(|apt| apt.involves_technician(technician_id))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Books an appointment: validates the window, rejects any
    /// double-booked technician, assigns the next `LH`-code.
    pub fn schedule_appointment(&mut self, input: AppointmentInput) -> StoreResult<Appointment> {
        input.validate()?;
        self.check_service_conflicts(&input, None)?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            code: self.next_appointment_code(),
            customer_id: input.customer_id,
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            status: AppointmentStatus::Pending,
            services: input.services,
            note: input.note,
            created_at: now,
            updated_at: now,
        };

        info!(
            appointment_id = %appointment.id,
            code = %appointment.code,
            date = %appointment.date,
            "Appointment scheduled"
        );
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }

    /// Rebooks an existing appointment, re-running the conflict check
    /// with itself excluded.
    pub fn reschedule_appointment(
        &mut self,
        id: &str,
        input: AppointmentInput,
    ) -> StoreResult<Appointment> {
        input.validate()?;
        // Lookup first so a missing id wins over a conflict.
        self.appointment_mut(id)?;
        self.check_service_conflicts(&input, Some(id))?;

        let appointment = self.appointment_mut(id)?;
        appointment.customer_id = input.customer_id;
        appointment.date = input.date;
        appointment.start_time = input.start_time;
        appointment.end_time = input.end_time;
        appointment.services = input.services;
        appointment.note = input.note;
        appointment.updated_at = Utc::now();

        debug!(appointment_id = %id, "Appointment rescheduled");
        Ok(appointment.clone())
    }

    /// Moves an appointment through its lifecycle.
    ///
    /// - `→ Completed` consumes every tagged package session (validated
    ///   up front; nothing is consumed if any would fail)
    /// - `Completed → Cancelled` returns those sessions
    /// - terminal states cannot be re-entered or left otherwise
    pub fn set_appointment_status(
        &mut self,
        id: &str,
        new_status: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        let (current, tagged) = {
            let apt = self
                .appointments
                .iter()
                .find(|a| a.id == id)
                .ok_or_else(|| StoreError::not_found("Appointment", id))?;
            (apt.status, tagged_sessions(&apt.services))
        };

        if current == new_status {
            return Ok(self.appointment_mut(id)?.clone());
        }

        let allowed = matches!(
            (current, new_status),
            (AppointmentStatus::Pending, AppointmentStatus::InProgress)
                | (AppointmentStatus::InProgress, AppointmentStatus::Pending)
                | (AppointmentStatus::Pending, AppointmentStatus::Completed)
                | (AppointmentStatus::InProgress, AppointmentStatus::Completed)
                | (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
                | (AppointmentStatus::InProgress, AppointmentStatus::Cancelled)
                | (AppointmentStatus::Completed, AppointmentStatus::Cancelled)
        );
        if !allowed {
            return Err(CoreError::InvalidStatusTransition {
                appointment_id: id.to_string(),
                current_status: format!("{:?}", current),
                requested_status: format!("{:?}", new_status),
            }
            .into());
        }

        match new_status {
            AppointmentStatus::Completed => {
                // Validate every consumption before applying any, so a bad
                // tag cannot leave the packages half-consumed.
                let mut seen: Vec<(String, u32)> = Vec::new();
                for (package_id, session_number) in &tagged {
                    let package = self
                        .package(package_id)
                        .ok_or_else(|| StoreError::not_found("Treatment package", package_id))?;
                    if *session_number == 0 || *session_number > package.total_sessions {
                        return Err(CoreError::SessionNumberOutOfRange {
                            session_number: *session_number,
                            total_sessions: package.total_sessions,
                        }
                        .into());
                    }
                    let pair = (package_id.clone(), *session_number);
                    if package.is_session_used(*session_number) || seen.contains(&pair) {
                        return Err(CoreError::DuplicateSessionUse {
                            package_id: package_id.clone(),
                            session_number: *session_number,
                        }
                        .into());
                    }
                    seen.push(pair);
                }
                for (package_id, session_number) in &tagged {
                    self.use_package_session(package_id, *session_number)?;
                }
            }
            AppointmentStatus::Cancelled if current == AppointmentStatus::Completed => {
                for (package_id, session_number) in &tagged {
                    // Missing packages are skipped: the cancel must win.
                    if self.package(package_id).is_some() {
                        self.return_package_session(package_id, *session_number)?;
                    }
                }
            }
            _ => {}
        }

        let appointment = self.appointment_mut(id)?;
        appointment.status = new_status;
        appointment.updated_at = Utc::now();

        info!(appointment_id = %id, status = ?new_status, "Appointment status changed");
        Ok(appointment.clone())
    }

    /// All appointments.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Looks up an appointment by id.
    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Next `LH`-code: highest existing numeric suffix + 1.
    pub(crate) fn next_appointment_code(&self) -> String {
        let next = self
            .appointments
            .iter()
            .filter_map(|a| a.code.strip_prefix(APPOINTMENT_CODE_PREFIX))
            .filter_map(|digits| digits.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        format!(
            "{}{:0width$}",
            APPOINTMENT_CODE_PREFIX,
            next,
            width = APPOINTMENT_CODE_DIGITS
        )
    }

    /// Runs the guard for every technician assigned in the input.
    fn check_service_conflicts(
        &self,
        input: &AppointmentInput,
        exclude: Option<&str>,
    ) -> StoreResult<()> {
        for service in &input.services {
            let Some(technician_id) = service.technician_id.as_deref() else {
                continue;
            };
            if let Some(conflict) = self.find_technician_conflict(
                technician_id,
                input.date,
                input.start_time,
                input.duration_minutes(),
                exclude,
            ) {
                return Err(CoreError::TechnicianConflict {
                    technician_id: technician_id.to_string(),
                    appointment_id: conflict.appointment_id,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Collects the `(package_id, session_number)` pairs tagged on services.
fn tagged_sessions(services: &[AppointmentService]) -> Vec<(String, u32)> {
    services
        .iter()
        .filter_map(|s| {
            match (&s.treatment_package_id, s.session_number) {
                (Some(pkg), Some(n)) => Some((pkg.clone(), n)),
                _ => None,
            }
        })
        .collect()
}
