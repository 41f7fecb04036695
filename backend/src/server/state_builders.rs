//! Builders wiring driven adapters into the services behind the HTTP and
//! WebSocket state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use workshop::domain::ports::{
    AccountRepository, AdminSettingsRepository, AnnouncementRepository, AuditLogRepository,
    AvailabilityRepository, BikeRepository, FrameNumberReaderError, FrameNumberRecognition,
    IdentityDirectory, IdentityResolver, RateLimitRepository, RepairTypeRepository,
    UnconfiguredFrameNumberReader, WorkRegistrationRepository,
};
use workshop::domain::{
    AccountService, AdminPromotionRepositories, AdminPromotionService, AnnouncementService,
    AvailabilityService, BikeService, BikeServiceSources, ChangeFeed, FrameNumberService,
    PriceListService, TableBoardService, TableBoardSources, TokenAuthenticator,
};
use workshop::inbound::http::state::HttpState;
use workshop::inbound::ws::state::WsState;
use workshop::outbound::memory::MemoryStore;
use workshop::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselAdminSettingsRepository, DieselAnnouncementRepository,
    DieselAuditLogRepository, DieselAvailabilityRepository, DieselBikeRepository,
    DieselIdentityStore, DieselRateLimitRepository, DieselRepairTypeRepository,
    DieselWorkRegistrationRepository,
};
use workshop::outbound::vision::{HttpFrameNumberReader, VisionGatewayConfig};

use super::config::WorkshopOptions;

/// One adapter per driven port.
pub(super) struct Adapters<Acc, Id, Set, Lim, Aud, Bik, Reg, Rep, Avl, Ann> {
    pub accounts: Arc<Acc>,
    pub identities: Arc<Id>,
    pub settings: Arc<Set>,
    pub rate_limits: Arc<Lim>,
    pub audit: Arc<Aud>,
    pub bikes: Arc<Bik>,
    pub registrations: Arc<Reg>,
    pub repair_types: Arc<Rep>,
    pub availability: Arc<Avl>,
    pub announcements: Arc<Ann>,
}

type DieselAdapters = Adapters<
    DieselAccountRepository,
    DieselIdentityStore,
    DieselAdminSettingsRepository,
    DieselRateLimitRepository,
    DieselAuditLogRepository,
    DieselBikeRepository,
    DieselWorkRegistrationRepository,
    DieselRepairTypeRepository,
    DieselAvailabilityRepository,
    DieselAnnouncementRepository,
>;

type MemoryAdapters = Adapters<
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
    MemoryStore,
>;

fn diesel_adapters(pool: &DbPool) -> DieselAdapters {
    Adapters {
        accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
        identities: Arc::new(DieselIdentityStore::new(pool.clone())),
        settings: Arc::new(DieselAdminSettingsRepository::new(pool.clone())),
        rate_limits: Arc::new(DieselRateLimitRepository::new(pool.clone())),
        audit: Arc::new(DieselAuditLogRepository::new(pool.clone())),
        bikes: Arc::new(DieselBikeRepository::new(pool.clone())),
        registrations: Arc::new(DieselWorkRegistrationRepository::new(pool.clone())),
        repair_types: Arc::new(DieselRepairTypeRepository::new(pool.clone())),
        availability: Arc::new(DieselAvailabilityRepository::new(pool.clone())),
        announcements: Arc::new(DieselAnnouncementRepository::new(pool.clone())),
    }
}

fn memory_adapters(store: &Arc<MemoryStore>) -> MemoryAdapters {
    Adapters {
        accounts: store.clone(),
        identities: store.clone(),
        settings: store.clone(),
        rate_limits: store.clone(),
        audit: store.clone(),
        bikes: store.clone(),
        registrations: store.clone(),
        repair_types: store.clone(),
        availability: store.clone(),
        announcements: store.clone(),
    }
}

/// Build the frame number service, calling the gateway only when one is
/// configured.
fn build_frame_numbers<Acc>(
    vision: Option<VisionGatewayConfig>,
    accounts: Arc<Acc>,
) -> Result<Arc<dyn FrameNumberRecognition>, FrameNumberReaderError>
where
    Acc: AccountRepository + 'static,
{
    Ok(match vision {
        Some(config) => Arc::new(FrameNumberService::new(
            Arc::new(HttpFrameNumberReader::new(config)?),
            accounts,
        )),
        None => Arc::new(FrameNumberService::new(
            Arc::new(UnconfiguredFrameNumberReader),
            accounts,
        )),
    })
}

/// HTTP and WebSocket state sharing one change feed.
pub(super) struct States {
    pub http: web::Data<HttpState>,
    pub ws: web::Data<WsState>,
}

fn build_states<Acc, Id, Set, Lim, Aud, Bik, Reg, Rep, Avl, Ann>(
    adapters: Adapters<Acc, Id, Set, Lim, Aud, Bik, Reg, Rep, Avl, Ann>,
    options: WorkshopOptions,
    clock: Arc<dyn Clock>,
) -> std::io::Result<States>
where
    Acc: AccountRepository + 'static,
    Id: IdentityResolver + IdentityDirectory + 'static,
    Set: AdminSettingsRepository + 'static,
    Lim: RateLimitRepository + 'static,
    Aud: AuditLogRepository + 'static,
    Bik: BikeRepository + 'static,
    Reg: WorkRegistrationRepository + 'static,
    Rep: RepairTypeRepository + 'static,
    Avl: AvailabilityRepository + 'static,
    Ann: AnnouncementRepository + 'static,
{
    let WorkshopOptions {
        admin_password,
        super_admin,
        transition_policy,
        board_refresh,
        password_hash_cost,
        vision,
    } = options;
    let Adapters {
        accounts,
        identities,
        settings,
        rate_limits,
        audit,
        bikes,
        registrations,
        repair_types,
        availability,
        announcements,
    } = adapters;
    let feed = ChangeFeed::new();

    let board = Arc::new(TableBoardService::new(
        TableBoardSources {
            bikes: bikes.clone(),
            registrations: registrations.clone(),
            repair_types: repair_types.clone(),
            accounts: accounts.clone(),
            announcements: announcements.clone(),
        },
        clock.clone(),
    ));
    let frame_numbers = build_frame_numbers(vision, accounts.clone())
        .map_err(|err| std::io::Error::other(format!("vision gateway setup failed: {err}")))?;

    let http = HttpState {
        authenticator: Arc::new(TokenAuthenticator::new(identities.clone(), clock.clone())),
        promotion: Arc::new(
            AdminPromotionService::new(
                AdminPromotionRepositories {
                    rate_limits,
                    settings,
                    audit,
                    accounts: accounts.clone(),
                },
                clock.clone(),
            )
            .with_fallback_secret(admin_password),
        ),
        accounts: Arc::new(
            AccountService::new(accounts.clone(), identities, super_admin)
                .with_hash_cost(password_hash_cost),
        ),
        bikes: Arc::new(
            BikeService::new(
                BikeServiceSources {
                    bikes,
                    registrations,
                    repair_types: repair_types.clone(),
                    accounts: accounts.clone(),
                },
                feed.clone(),
                clock.clone(),
            )
            .with_policy(transition_policy),
        ),
        price_list: Arc::new(PriceListService::new(repair_types, accounts.clone())),
        availability: Arc::new(AvailabilityService::new(
            availability,
            accounts.clone(),
            clock.clone(),
        )),
        announcements: Arc::new(AnnouncementService::new(
            announcements,
            accounts,
            feed.clone(),
            clock,
        )),
        board: board.clone(),
        frame_numbers,
    };
    let ws = WsState::new(board, feed).with_refresh(board_refresh);

    Ok(States {
        http: web::Data::new(http),
        ws: web::Data::new(ws),
    })
}

/// Select Diesel adapters when a pool is configured, memory otherwise.
pub(super) fn build_server_states(
    db_pool: Option<&DbPool>,
    options: WorkshopOptions,
) -> std::io::Result<States> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match db_pool {
        Some(pool) => build_states(diesel_adapters(pool), options, clock),
        None => {
            warn!("no database configured; workshop data lives in memory");
            build_states(memory_adapters(&Arc::new(MemoryStore::new())), options, clock)
        }
    }
}
