use chrono::{DateTime, Utc};
use chrono_tz::America::Bogota;
use chrono_tz::Tz;

const DISPLAY_TZ: Tz = Bogota;

/// Three-letter lowercase weekday code for `instant` in the display
/// timezone, e.g. `mon`.
pub fn weekday_code(instant: DateTime<Utc>) -> &'static str {
    match instant.with_timezone(&DISPLAY_TZ).format("%a").to_string().to_lowercase().as_str() {
        "mon" => "mon",
        "tue" => "tue",
        "wed" => "wed",
        "thu" => "thu",
        "fri" => "fri",
        "sat" => "sat",
        _ => "sun",
    }
}

/// `HH:MM` string for `instant` in the display timezone.
pub fn hhmm(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&DISPLAY_TZ).format("%H:%M").to_string()
}

/// `true` if `last_run_at`, converted to the display timezone, falls on the
/// same calendar date and `HH:MM` as `now` (spec §4.7 step 3 idempotence
/// guard — same minute should never dispatch twice).
pub fn already_ran_this_slot(last_run_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    let Some(last) = last_run_at else { return false };
    let last_local = last.with_timezone(&DISPLAY_TZ);
    let now_local = now.with_timezone(&DISPLAY_TZ);
    last_local.date_naive() == now_local.date_naive() && last_local.format("%H:%M").to_string() == now_local.format("%H:%M").to_string()
}
