use chrono::{DateTime, Duration, Utc};
use sqlx::Postgres;

use crate::errors::VigiloError;
use crate::models::{EventType, Severity, Technique, ThreatActor};

/// Debouncer silence window (spec §4.4): successive alerts for the same
/// (actor, technique, event_type) within this window are suppressed.
const ALERT_WINDOW: Duration = Duration::hours(24);

/// Gates an intelligence event into an Alert row, subject to the 24h
/// debounce window (spec §4.4, property 5). A missing `AlertState` is
/// created lazily and always alerts; an existing one alerts only once
/// the window has elapsed. Runs within the reconciliation actor's
/// transaction so the alert and the state update are atomic with the
/// event that triggered them.
pub async fn maybe_alert(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    actor: &ThreatActor,
    technique: &Technique,
    event_type: EventType,
    context: &str,
    now: DateTime<Utc>,
) -> Result<bool, VigiloError> {
    let existing: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, last_alert_at FROM alert_state
         WHERE actor_id = $1 AND technique_id = $2 AND event_type = $3",
    )
    .bind(actor.id)
    .bind(technique.id)
    .bind(event_type.as_str())
    .fetch_optional(&mut **tx)
    .await?;

    let should_alert = match existing {
        None => {
            sqlx::query(
                "INSERT INTO alert_state (actor_id, technique_id, event_type, last_alert_at)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(actor.id)
            .bind(technique.id)
            .bind(event_type.as_str())
            .bind(now)
            .execute(&mut **tx)
            .await?;
            true
        }
        Some((_, last_alert_at)) => {
            let elapsed = now - last_alert_at;
            if elapsed > ALERT_WINDOW {
                sqlx::query(
                    "UPDATE alert_state SET last_alert_at = $4
                     WHERE actor_id = $1 AND technique_id = $2 AND event_type = $3",
                )
                .bind(actor.id)
                .bind(technique.id)
                .bind(event_type.as_str())
                .bind(now)
                .execute(&mut **tx)
                .await?;
                true
            } else {
                false
            }
        }
    };

    if !should_alert {
        return Ok(false);
    }

    let severity = Severity::for_event(event_type);
    let title = format!("{} using {}", actor.name, technique.external_code);
    sqlx::query(
        "INSERT INTO alerts (actor_id, technique_id, title, description, severity, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(actor.id)
    .bind(technique.id)
    .bind(&title)
    .bind(context)
    .bind(severity.as_str())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_map_matches_spec() {
        assert_eq!(Severity::for_event(EventType::New).as_str(), "HIGH");
        assert_eq!(Severity::for_event(EventType::Reactivated).as_str(), "MEDIUM");
        assert_eq!(Severity::for_event(EventType::Disappeared).as_str(), "LOW");
    }
}
