//! Kanban-style job application tracker.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Wishlist,
    Applied,
    Interviewing,
    Offer,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplicationRecord {
    pub id: u64,
    pub company: String,
    pub title: String,
    pub status: ApplicationStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("Company and job title are required")]
    MissingFields,

    #[error("Application {0} not found")]
    NotFound(u64),
}

/// Application records plus the id counter. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct ApplicationTracker {
    records: Vec<JobApplicationRecord>,
    next_id: u64,
}

impl ApplicationTracker {
    pub fn records(&self) -> &[JobApplicationRecord] {
        &self.records
    }

    pub fn add(
        &mut self,
        company: &str,
        title: &str,
        status: ApplicationStatus,
    ) -> Result<JobApplicationRecord, TrackerError> {
        self.add_on(company, title, status, Local::now().date_naive())
    }

    fn add_on(
        &mut self,
        company: &str,
        title: &str,
        status: ApplicationStatus,
        date: NaiveDate,
    ) -> Result<JobApplicationRecord, TrackerError> {
        let (company, title) = (company.trim(), title.trim());
        if company.is_empty() || title.is_empty() {
            return Err(TrackerError::MissingFields);
        }

        self.next_id += 1;
        let record = JobApplicationRecord {
            id: self.next_id,
            company: company.to_string(),
            title: title.to_string(),
            status,
            date,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn move_to(
        &mut self,
        id: u64,
        status: ApplicationStatus,
    ) -> Result<JobApplicationRecord, TrackerError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(TrackerError::NotFound(id))?;
        record.status = status;
        Ok(record.clone())
    }

    pub fn delete(&mut self, id: u64) -> Result<(), TrackerError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(TrackerError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut tracker = ApplicationTracker::default();
        let a = tracker
            .add_on("Acme", "Backend Engineer", ApplicationStatus::Wishlist, day())
            .unwrap();
        let b = tracker
            .add_on("Globex", "SRE", ApplicationStatus::Applied, day())
            .unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(tracker.records().len(), 2);
        assert_eq!(a.date, day());
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut tracker = ApplicationTracker::default();
        let a = tracker
            .add_on("Acme", "Dev", ApplicationStatus::Wishlist, day())
            .unwrap();
        tracker.delete(a.id).unwrap();
        let b = tracker
            .add_on("Acme", "Dev", ApplicationStatus::Wishlist, day())
            .unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_blank_company_or_title_is_rejected() {
        let mut tracker = ApplicationTracker::default();
        assert_eq!(
            tracker.add(" ", "Dev", ApplicationStatus::Applied),
            Err(TrackerError::MissingFields)
        );
        assert_eq!(
            tracker.add("Acme", "", ApplicationStatus::Applied),
            Err(TrackerError::MissingFields)
        );
        assert!(tracker.records().is_empty());
    }

    #[test]
    fn test_move_changes_column() {
        let mut tracker = ApplicationTracker::default();
        let a = tracker
            .add_on("Acme", "Dev", ApplicationStatus::Applied, day())
            .unwrap();

        let moved = tracker.move_to(a.id, ApplicationStatus::Interviewing).unwrap();

        assert_eq!(moved.status, ApplicationStatus::Interviewing);
        assert_eq!(tracker.records()[0].status, ApplicationStatus::Interviewing);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut tracker = ApplicationTracker::default();
        assert_eq!(
            tracker.move_to(9, ApplicationStatus::Offer),
            Err(TrackerError::NotFound(9))
        );
        assert_eq!(tracker.delete(9), Err(TrackerError::NotFound(9)));
    }

    #[test]
    fn test_status_serializes_as_variant_name() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Interviewing).unwrap(),
            "\"Interviewing\""
        );
    }
}
