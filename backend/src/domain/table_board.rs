//! Read model behind the workshop TV.
//!
//! The board always lists every table, numbered ones first, with `null` for
//! free tables. Occupied tables carry the bike, its mechanic, how many
//! calendar days it has been in the workshop and its repair lines.
//!
//! Snapshots are rebuilt wholesale from storage with a fixed number of
//! batched queries; there is no incremental update.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use super::ports::{
    AccountRepository, AnnouncementRepository, BikeRepository, RepairTypeRepository,
    TableBoardQuery, WorkRegistrationRepository,
};
use super::service_support::{
    map_account_error, map_announcement_error, map_bike_error, map_registration_error,
    map_repair_type_error,
};
use super::{
    Bike, BikeId, Error, Language, RepairTypeId, TableLabel, TvAnnouncement, UserId,
    WorkRegistration,
};

/// Repair line as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardRegistration {
    pub name: String,
    pub completed: bool,
    pub completed_by_name: Option<String>,
}

/// Bike parked at a table, enriched for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardOccupant {
    pub bike: Bike,
    pub mechanic_name: Option<String>,
    pub days_on_table: i64,
    pub progress_percent: f64,
    pub status_label: String,
    pub registrations: Vec<BoardRegistration>,
}

/// One table and whoever occupies it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardSlot {
    pub table: String,
    pub occupant: Option<BoardOccupant>,
}

/// Full snapshot pushed to the TV.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableBoard {
    pub slots: Vec<BoardSlot>,
    pub announcements: Vec<TvAnnouncement>,
    pub generated_at: DateTime<Utc>,
}

impl TableBoard {
    /// Occupant of `table`, if any.
    #[must_use]
    pub fn occupant(&self, table: &str) -> Option<&BoardOccupant> {
        self.slots
            .iter()
            .find(|slot| slot.table == table)
            .and_then(|slot| slot.occupant.as_ref())
    }
}

/// Calendar days a bike has been in the workshop, counting the intake day
/// as day 1.
///
/// Both instants are converted to `tz` and only their dates are compared, so
/// a bike taken in late in the evening is on day 2 right after midnight.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use workshop::domain::days_on_table;
///
/// let created = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
/// assert_eq!(days_on_table(created, now, &Utc), 2);
/// ```
#[must_use]
pub fn days_on_table<Tz: TimeZone>(created_at: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> i64 {
    let created = created_at.with_timezone(tz).date_naive();
    let today = now.with_timezone(tz).date_naive();
    (today - created).num_days() + 1
}

/// Inputs fetched for one snapshot.
#[derive(Debug, Default)]
pub struct BoardInputs {
    pub bikes: Vec<Bike>,
    pub registrations: Vec<WorkRegistration>,
    pub repair_names: HashMap<RepairTypeId, String>,
    pub display_names: HashMap<UserId, String>,
}

impl BoardInputs {
    /// Users whose names the board shows: current mechanics and completers.
    #[must_use]
    pub fn referenced_users(bikes: &[Bike], registrations: &[WorkRegistration]) -> Vec<UserId> {
        bikes
            .iter()
            .filter_map(|bike| bike.current_mechanic_id)
            .chain(registrations.iter().filter_map(|reg| reg.completed_by))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Build every slot from already-fetched inputs.
///
/// Bikes without a table, completed bikes and bikes on unknown tables are
/// ignored; when two open bikes claim the same table the oldest wins.
#[must_use]
pub fn assemble_slots<Tz: TimeZone>(
    inputs: BoardInputs,
    now: DateTime<Utc>,
    tz: &Tz,
    language: Language,
) -> Vec<BoardSlot> {
    let BoardInputs {
        mut bikes,
        registrations,
        repair_names,
        display_names,
    } = inputs;

    let mut by_bike: HashMap<BikeId, Vec<WorkRegistration>> = HashMap::new();
    for registration in registrations {
        by_bike
            .entry(registration.bike_id)
            .or_default()
            .push(registration);
    }

    bikes.sort_by_key(|bike| bike.created_at);
    let mut by_table: HashMap<TableLabel, BoardOccupant> = HashMap::new();
    for bike in bikes.into_iter().filter(|bike| !bike.is_completed()) {
        let Some(table) = bike.table else { continue };
        if by_table.contains_key(&table) {
            continue;
        }
        let name_of = |id: Option<UserId>| id.and_then(|id| display_names.get(&id).cloned());
        let lines = by_bike
            .remove(&bike.id)
            .unwrap_or_default()
            .into_iter()
            .map(|reg| BoardRegistration {
                name: repair_names
                    .get(&reg.repair_type_id)
                    .cloned()
                    .unwrap_or_else(|| reg.repair_type_id.to_string()),
                completed: reg.completed,
                completed_by_name: name_of(reg.completed_by),
            })
            .collect();
        let occupant = BoardOccupant {
            mechanic_name: name_of(bike.current_mechanic_id),
            days_on_table: days_on_table(bike.created_at, now, tz),
            progress_percent: bike.workflow_status.progress_percent(),
            status_label: bike.workflow_status.label(language).to_owned(),
            registrations: lines,
            bike,
        };
        by_table.insert(table, occupant);
    }

    TableLabel::all()
        .into_iter()
        .map(|table| BoardSlot {
            table: table.to_string(),
            occupant: by_table.remove(&table),
        })
        .collect()
}

/// Service building [`TableBoard`] snapshots from the repositories.
#[derive(Clone)]
pub struct TableBoardService<B, W, R, A, N> {
    bikes: Arc<B>,
    registrations: Arc<W>,
    repair_types: Arc<R>,
    accounts: Arc<A>,
    announcements: Arc<N>,
    clock: Arc<dyn Clock>,
    language: Language,
}

/// Repositories a [`TableBoardService`] reads from.
pub struct TableBoardSources<B, W, R, A, N> {
    pub bikes: Arc<B>,
    pub registrations: Arc<W>,
    pub repair_types: Arc<R>,
    pub accounts: Arc<A>,
    pub announcements: Arc<N>,
}

impl<B, W, R, A, N> TableBoardService<B, W, R, A, N> {
    pub fn new(sources: TableBoardSources<B, W, R, A, N>, clock: Arc<dyn Clock>) -> Self {
        let TableBoardSources {
            bikes,
            registrations,
            repair_types,
            accounts,
            announcements,
        } = sources;
        Self {
            bikes,
            registrations,
            repair_types,
            accounts,
            announcements,
            clock,
            language: Language::Nl,
        }
    }
}

#[async_trait]
impl<B, W, R, A, N> TableBoardQuery for TableBoardService<B, W, R, A, N>
where
    B: BikeRepository,
    W: WorkRegistrationRepository,
    R: RepairTypeRepository,
    A: AccountRepository,
    N: AnnouncementRepository,
{
    async fn snapshot(&self) -> Result<TableBoard, Error> {
        let now = self.clock.utc();
        let bikes = self.bikes.on_tables().await.map_err(map_bike_error)?;
        let bike_ids: Vec<BikeId> = bikes.iter().map(|bike| bike.id).collect();
        let registrations = self
            .registrations
            .for_bikes(&bike_ids)
            .await
            .map_err(map_registration_error)?;
        let users = BoardInputs::referenced_users(&bikes, &registrations);
        let display_names = self
            .accounts
            .display_names(&users)
            .await
            .map_err(map_account_error)?;
        let repair_ids: Vec<RepairTypeId> = registrations
            .iter()
            .map(|reg| reg.repair_type_id)
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        let repair_names = self
            .repair_types
            .names(&repair_ids)
            .await
            .map_err(map_repair_type_error)?;
        let announcements = self
            .announcements
            .list()
            .await
            .map_err(map_announcement_error)?
            .into_iter()
            .filter(|announcement| announcement.is_visible(now))
            .collect();

        let occupied = bikes.len();
        let slots = assemble_slots(
            BoardInputs {
                bikes,
                registrations,
                repair_names,
                display_names,
            },
            now,
            &Local,
            self.language,
        );
        debug!(occupied, "table board snapshot built");
        Ok(TableBoard {
            slots,
            announcements,
            generated_at: now,
        })
    }
}
