use crate::domain::{TrainSchedule, TravelDate, weekday_name};
use crate::error::CoreError;

/// Check that the train runs on the weekday of `date`.
pub fn validate(schedule: &TrainSchedule, date: TravelDate) -> Result<(), CoreError> {
    let day = date.weekday();
    if schedule.runs_on(day) {
        return Ok(());
    }
    Err(CoreError::ScheduleNotRunningOnDate {
        weekday: weekday_name(day).to_string(),
        train: schedule.name.clone(),
    })
}

/// [`validate`] for a date in the display form, e.g. `15-Oct-2026`.
pub fn validate_display(schedule: &TrainSchedule, display: &str) -> Result<TravelDate, CoreError> {
    let date = TravelDate::parse(display)
        .map_err(|e| CoreError::InvalidInput(format!("travel date {display:?}: {e}")))?;
    validate(schedule, date)?;
    Ok(date)
}
