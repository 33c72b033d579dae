use sqlx::PgPool;
use tracing::instrument;

use cuidame_core::{AppError, Paginated};

use crate::middleware::context::GroupMember;
use crate::utils::auth_helpers::assignee_in_group;
use crate::utils::db::{delete_scoped, found, is_check_violation};
use crate::utils::patch::{merge_required, merge_text};

use super::model::{
    CategoryTotal, CreateExpenseRequest, EXPENSE_COLUMNS, Expense, ExpenseFilterParams,
    ExpenseSummary, SummaryParams, UpdateExpenseRequest, normalize_category,
};

const WHAT: &str = "Gasto";

fn write_error(err: sqlx::Error) -> AppError {
    if is_check_violation(&err) {
        return AppError::unprocessable("El monto no puede ser negativo");
    }
    AppError::from(err)
}

pub struct ExpenseService;

impl ExpenseService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        grupo_id: i64,
        filters: ExpenseFilterParams,
    ) -> Result<Paginated<Expense>, AppError> {
        let categoria = filters
            .categoria
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase);
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        const WHERE_CLAUSE: &str = r#"
            WHERE grupo_id = $1
              AND ($2::text IS NULL OR categoria = $2)
              AND ($3::date IS NULL OR fecha >= $3)
              AND ($4::date IS NULL OR fecha <= $4)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM gastos {WHERE_CLAUSE}"
        ))
        .bind(grupo_id)
        .bind(&categoria)
        .bind(filters.desde)
        .bind(filters.hasta)
        .fetch_one(db)
        .await?;

        let elementos = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM gastos {WHERE_CLAUSE}
             ORDER BY fecha DESC, id DESC
             LIMIT $5 OFFSET $6"
        ))
        .bind(grupo_id)
        .bind(&categoria)
        .bind(filters.desde)
        .bind(filters.hasta)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            elementos,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn summary(
        db: &PgPool,
        grupo_id: i64,
        params: SummaryParams,
    ) -> Result<ExpenseSummary, AppError> {
        let categories = sqlx::query_as::<_, CategoryTotal>(
            r#"SELECT categoria, SUM(monto) AS total, COUNT(*) AS cantidad
               FROM gastos
               WHERE grupo_id = $1
                 AND ($2::date IS NULL OR fecha >= $2)
                 AND ($3::date IS NULL OR fecha <= $3)
               GROUP BY categoria
               ORDER BY total DESC, categoria ASC"#,
        )
        .bind(grupo_id)
        .bind(params.desde)
        .bind(params.hasta)
        .fetch_all(db)
        .await?;

        Ok(ExpenseSummary::from_categories(categories))
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, grupo_id: i64, id: i64) -> Result<Expense, AppError> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM gastos WHERE id = $1 AND grupo_id = $2"
        ))
        .bind(id)
        .bind(grupo_id)
        .fetch_optional(db)
        .await?;

        found(expense, WHAT)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn create(
        db: &PgPool,
        member: &GroupMember,
        dto: CreateExpenseRequest,
    ) -> Result<Expense, AppError> {
        let caller = member.auth.user_id();
        let pagado_por =
            assignee_in_group(db, member.grupo_id, caller, dto.pagado_por, "pagado_por").await?;

        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"INSERT INTO gastos
                   (grupo_id, concepto, categoria, monto, fecha, pagado_por, notas, creado_por)
               VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE), $6, $7, $8)
               RETURNING {EXPENSE_COLUMNS}"#
        ))
        .bind(member.grupo_id)
        .bind(dto.concepto.trim())
        .bind(normalize_category(dto.categoria.as_deref()))
        .bind(dto.monto.round_dp(2))
        .bind(dto.fecha)
        .bind(pagado_por)
        .bind(merge_text(dto.notas, None))
        .bind(caller)
        .fetch_one(db)
        .await
        .map_err(write_error)?;

        Ok(expense)
    }

    #[instrument(skip(db, member, dto), fields(grupo_id = member.grupo_id))]
    pub async fn update(
        db: &PgPool,
        member: &GroupMember,
        id: i64,
        dto: UpdateExpenseRequest,
    ) -> Result<Expense, AppError> {
        let current = Self::get(db, member.grupo_id, id).await?;

        let pagado_por = match dto.pagado_por {
            Some(requested) => Some(
                assignee_in_group(
                    db,
                    member.grupo_id,
                    member.auth.user_id(),
                    Some(requested),
                    "pagado_por",
                )
                .await?,
            ),
            None => current.pagado_por,
        };
        let categoria = match dto.categoria.as_deref() {
            Some(c) => normalize_category(Some(c)),
            None => current.categoria,
        };

        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"UPDATE gastos
               SET concepto = $3, categoria = $4, monto = $5, fecha = $6, pagado_por = $7,
                   notas = $8, fecha_actualizacion = NOW()
               WHERE id = $1 AND grupo_id = $2
               RETURNING {EXPENSE_COLUMNS}"#
        ))
        .bind(id)
        .bind(member.grupo_id)
        .bind(merge_required(dto.concepto, current.concepto))
        .bind(categoria)
        .bind(dto.monto.map(|m| m.round_dp(2)).unwrap_or(current.monto))
        .bind(dto.fecha.unwrap_or(current.fecha))
        .bind(pagado_por)
        .bind(merge_text(dto.notas, current.notas))
        .fetch_optional(db)
        .await
        .map_err(write_error)?;

        found(expense, WHAT)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, grupo_id: i64, id: i64) -> Result<(), AppError> {
        delete_scoped(db, "gastos", grupo_id, id, WHAT).await
    }
}
