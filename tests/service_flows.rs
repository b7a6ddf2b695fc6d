// tests/service_flows.rs
//
// Fluxos de serviço contra um Postgres real. O #[sqlx::test] cria um banco
// descartável por teste e aplica ./migrations.
// Rodar com: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::Local;
use rust_decimal::Decimal;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use hub_backend::{
    common::{error::AppError, uploads::UploadStore},
    config::AppState,
    db::{checkin_repo::NewCheckin, CheckinRepository},
    models::{
        checkin::{CheckinFilter, CheckinKind},
        group::Group,
        promoter::{PromoterDetail, PromoterPayload},
        report::{AdvancedReportFilter, SubmitReportPayload},
        store::{Store, StorePayload},
    },
};

fn state(pool: PgPool) -> AppState {
    AppState::with_pool(pool, UploadStore::new(std::env::temp_dir().join("hub-backend-tests")))
}

fn store_payload(name: &str, cnpj: &str, group_id: Option<i32>) -> StorePayload {
    StorePayload {
        company_name: name.into(),
        brand: None,
        cnpj: Some(cnpj.into()),
        address: None,
        city: Some("Campinas".into()),
        state: Some("SP".into()),
        group_id,
    }
}

async fn promoter_with_store(state: &AppState, phone: &str, store: &Store) -> PromoterDetail {
    state
        .promoter_service
        .create(PromoterPayload {
            full_name: "Ana Souza".into(),
            cpf: None,
            phone: phone.into(),
            city: None,
            state: None,
            store_ids: vec![store.id],
        })
        .await
        .unwrap()
}

async fn group_with_store(state: &AppState) -> (Group, Store) {
    let group = state.group_service.create("Supermercados Norte").await.unwrap();
    let store = state
        .store_service
        .create(store_payload("Mercado Bom Preço", "12345678000190", Some(group.id)))
        .await
        .unwrap();
    (group, store)
}

// =============================================================================
//  AUTENTICAÇÃO
// =============================================================================

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn promoter_logs_in_with_default_password(pool: PgPool) {
    let state = state(pool);
    let (_, store) = group_with_store(&state).await;
    let promoter = promoter_with_store(&state, "11999998888", &store).await;

    let user = state
        .auth_service
        .login("11999998888", "hub@11999998888")
        .await
        .unwrap();
    assert_eq!(user.id, promoter.id);

    let wrong = state.auth_service.login("11999998888", "errada").await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn inactive_promoter_is_refused_after_password_check(pool: PgPool) {
    let state = state(pool);
    let (_, store) = group_with_store(&state).await;
    let promoter = promoter_with_store(&state, "11988887777", &store).await;
    state.promoter_service.toggle_active(promoter.id).await.unwrap();

    let login = state.auth_service.login("11988887777", "hub@11988887777").await;
    assert!(matches!(login, Err(AppError::InactiveUser)));

    // Senha errada continua sendo só "login inválido"
    let login = state.auth_service.login("11988887777", "outra").await;
    assert!(matches!(login, Err(AppError::InvalidCredentials)));
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn unknown_login_is_invalid_credentials(pool: PgPool) {
    let state = state(pool);
    state.auth_service.ensure_master_user("segredo").await.unwrap();
    let (_, store) = group_with_store(&state).await;
    promoter_with_store(&state, "11999990000", &store).await;

    // Telefone sem promotora e usuário inexistente caem no mesmo erro de senha errada
    for (identifier, password) in [("00000000000", "x"), ("naoexiste", "x")] {
        let login = state.auth_service.login(identifier, password).await;
        assert!(
            matches!(login, Err(AppError::InvalidCredentials)),
            "{identifier}: {login:?}"
        );
    }
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn master_user_is_created_once(pool: PgPool) {
    let state = state(pool.clone());
    state.auth_service.ensure_master_user("segredo").await.unwrap();
    state.auth_service.ensure_master_user("outra").await.unwrap();

    let masters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'master'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(masters, 1);
    assert!(state.auth_service.login("master", "segredo").await.is_ok());
}

// =============================================================================
//  RELATÓRIOS
// =============================================================================

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn report_for_store_without_group_is_not_saved(pool: PgPool) {
    let state = state(pool.clone());
    let store = state
        .store_service
        .create(store_payload("Loja Sem Grupo", "99999999000199", None))
        .await
        .unwrap();
    let promoter = promoter_with_store(&state, "11977776666", &store).await;

    let result = state
        .report_service
        .submit(
            promoter.id,
            SubmitReportPayload { store_id: Some(store.id), values: Default::default() },
        )
        .await;
    assert!(matches!(result, Err(AppError::Warning(_))));

    let reports: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reports, 0);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn aggregation_ignores_non_numeric_values(pool: PgPool) {
    let state = state(pool);
    let (group, store) = group_with_store(&state).await;
    let field = state.group_service.add_field(group.id, "Estoque").await.unwrap();
    let promoter = promoter_with_store(&state, "11966665555", &store).await;

    for value in ["10", "abc", "5"] {
        state
            .report_service
            .submit(
                promoter.id,
                SubmitReportPayload {
                    store_id: Some(store.id),
                    values: [(field.id, value.to_string())].into_iter().collect(),
                },
            )
            .await
            .unwrap();
    }

    let today = Local::now().date_naive();
    let table = state
        .report_service
        .aggregate(&AdvancedReportFilter {
            group_id: group.id,
            date_from: today,
            date_to: today,
            promoter_id: None,
            store_id: None,
            fields: vec![format!("{}_total", field.id), format!("{}_media", field.id)],
        })
        .await
        .unwrap();

    assert_eq!(table.headers, ["Promotora", "Loja", "Estoque (Total)", "Estoque (Média)"]);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].values[0], Some(Decimal::new(15, 0)));
    assert_eq!(table.rows[0].values[1], Some(Decimal::new(75, 1)));
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn aggregation_rejects_fields_from_other_groups(pool: PgPool) {
    let state = state(pool);
    let (group, _) = group_with_store(&state).await;
    let other = state.group_service.create("Farmácias").await.unwrap();
    let foreign = state.group_service.add_field(other.id, "Vendas").await.unwrap();

    let today = Local::now().date_naive();
    let result = state
        .report_service
        .aggregate(&AdvancedReportFilter {
            group_id: group.id,
            date_from: today,
            date_to: today,
            promoter_id: None,
            store_id: None,
            fields: vec![format!("{}_total", foreign.id)],
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

// =============================================================================
//  "HOJE" NO DASHBOARD E NO HISTÓRICO
// =============================================================================

// Etc/GMT+12 e Etc/GMT-14 ficam 26h distantes: em qualquer horário, pelo menos um
// dos dois está num dia diferente do relógio local da aplicação.
#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn today_does_not_follow_database_time_zone(
    pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let pool = pool_opts.clone().connect_with(connect_opts.clone()).await.unwrap();
    let setup = state(pool.clone());
    let (group, store) = group_with_store(&setup).await;
    let field = setup.group_service.add_field(group.id, "Estoque").await.unwrap();
    let promoter = promoter_with_store(&setup, "11922221111", &store).await;

    let report = setup
        .report_service
        .submit(
            promoter.id,
            SubmitReportPayload {
                store_id: Some(store.id),
                values: [(field.id, "3".to_string())].into_iter().collect(),
            },
        )
        .await
        .unwrap();
    CheckinRepository::new(pool)
        .create(NewCheckin {
            user_id: promoter.id,
            store_id: store.id,
            kind: CheckinKind::Checkin,
            latitude: None,
            longitude: None,
            image_path: "checkin_teste.png",
        })
        .await
        .unwrap();

    let today = Local::now().date_naive();
    assert_eq!(report.report_date, today);

    for time_zone in ["Etc/GMT+12", "Etc/GMT-14"] {
        let shifted = pool_opts
            .clone()
            .connect_with(connect_opts.clone().options([("timezone", time_zone)]))
            .await
            .unwrap();
        let state = state(shifted);

        let summary = state.dashboard_service.get_summary().await.unwrap();
        assert_eq!(summary.reports_today, 1, "{time_zone}");
        assert_eq!(summary.checkins_today, 1, "{time_zone}");
        let last_day = summary.reports_by_day.last().unwrap();
        assert_eq!((last_day.day, last_day.total), (today, 1), "{time_zone}");
        assert_eq!(summary.checkins_by_kind.len(), 1, "{time_zone}");

        let history = state
            .checkin_service
            .history(&CheckinFilter {
                date_from: Some(today),
                date_to: Some(today),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(history.len(), 1, "{time_zone}");
    }
}

// =============================================================================
//  CADASTROS
// =============================================================================

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn blank_names_are_rejected_before_saving(pool: PgPool) {
    let state = state(pool.clone());

    let store = state.store_service.create(store_payload("   ", "55666777000188", None)).await;
    assert!(matches!(store, Err(AppError::BadRequest(_))));
    let group = state.group_service.create("  ").await;
    assert!(matches!(group, Err(AppError::BadRequest(_))));

    let stores: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stores, 0);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn deleting_group_keeps_stores_and_drops_fields(pool: PgPool) {
    let state = state(pool.clone());
    let (group, store) = group_with_store(&state).await;
    state.group_service.add_field(group.id, "Estoque").await.unwrap();

    state.group_service.delete(group.id).await.unwrap();

    let store = state.store_service.get(store.id).await.unwrap();
    assert_eq!(store.group_id, None);

    let fields: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM report_fields")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fields, 0);

    let again = state.group_service.delete(group.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn duplicate_group_name_is_a_conflict(pool: PgPool) {
    let state = state(pool);
    state.group_service.create("Atacarejo").await.unwrap();

    let duplicate = state.group_service.create("Atacarejo").await;
    assert!(matches!(duplicate, Err(AppError::UniqueConstraintViolation(_))));
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn toggling_twice_restores_active_state(pool: PgPool) {
    let state = state(pool);
    let (_, store) = group_with_store(&state).await;
    let promoter = promoter_with_store(&state, "11955554444", &store).await;

    let first = state.promoter_service.toggle_active(promoter.id).await.unwrap();
    let second = state.promoter_service.toggle_active(promoter.id).await.unwrap();

    assert!(!first.active);
    assert!(second.active);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn promoter_needs_at_least_one_store(pool: PgPool) {
    let state = state(pool);
    let result = state
        .promoter_service
        .create(PromoterPayload {
            full_name: "Bia".into(),
            cpf: None,
            phone: "11944443333".into(),
            city: None,
            state: None,
            store_ids: Vec::new(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Warning(_))));
}

// =============================================================================
//  IMPORTAÇÃO
// =============================================================================

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn reimporting_stores_upserts_by_cnpj(pool: PgPool) {
    let state = state(pool.clone());
    let group = state.group_service.create("Importadas").await.unwrap();

    let first = "RAZAO_SOCIAL,CNPJ,BANDEIRA,CIDADE,UF\nMercado A,11222333000144,Rede A,Santos,SP\n";
    let second = "razao_social , cnpj ,bandeira\nMercado A Ltda,11222333000144,Rede B\n,,\n";

    let summary = state
        .import_service
        .import_stores(group.id, "lojas.csv", first.as_bytes())
        .await
        .unwrap();
    assert_eq!(summary.imported, 1);
    state
        .import_service
        .import_stores(group.id, "lojas.csv", second.as_bytes())
        .await
        .unwrap();

    let names: Vec<String> = sqlx::query_scalar("SELECT company_name FROM stores")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(names, ["Mercado A Ltda"]);
}

#[sqlx::test]
#[ignore = "requer DATABASE_URL"]
async fn imported_promoters_get_assigned_by_group(pool: PgPool) {
    let state = state(pool);
    let (_, store) = group_with_store(&state).await;

    let sheet = "NOME,TELEFONE,CNPJ_LOJA,GRUPO\nCarla,11933332222,,Supermercados Norte\n";
    let summary = state
        .import_service
        .import_promoters("promotoras.csv", sheet.as_bytes())
        .await
        .unwrap();
    assert_eq!(summary.imported, 1);

    let user = state
        .auth_service
        .login("11933332222", "hub@11933332222")
        .await
        .unwrap();
    let detail = state.promoter_service.get(user.id).await.unwrap();
    assert_eq!(detail.store_ids, [store.id]);
}
