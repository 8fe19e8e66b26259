use super::SyncContext;
use crate::errors::{AppError, AppResult};
use crate::models::purchases::{PageQuery, Purchase, PurchaseFilter, PurchaseStatus};
use crate::paginator::Paginator;
use crate::remote::PurchasesApi;
use crate::remote::models::purchases::{PageDto, PurchaseCreateRequest, PurchaseDto};
use crate::resource::Resource;
use crate::store::entity::{Table, int};
use crate::store::live::LiveQuery;
use crate::store::{Criteria, like, load_by_id, load_where};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct PurchasesRepository {
    ctx: SyncContext,
    api: Arc<dyn PurchasesApi>,
}

impl PurchasesRepository {
    pub fn new(ctx: SyncContext, api: Arc<dyn PurchasesApi>) -> Self {
        Self { ctx, api }
    }

    pub fn scoped(&self) -> Self {
        self.scoped_in(&self.ctx.scoped())
    }

    pub(crate) fn scoped_in(&self, ctx: &SyncContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: Arc::clone(&self.api),
        }
    }

    async fn load_page(&self, query: &PageQuery) -> AppResult<PageDto<PurchaseDto>> {
        let page = self.ctx.call(self.api.get_purchases(query)).await?;
        let rows: Vec<Purchase> = page.content.iter().map(PurchaseDto::to_entity).collect();
        self.ctx.store().upsert(&rows)?;
        debug!(page = query.page, rows = rows.len(), "purchases page stored");
        Ok(page)
    }

    /// Fetch one page and cache its content.
    pub async fn fetch_purchases(&self, query: &PageQuery) -> Resource<PageDto<PurchaseDto>> {
        self.ctx
            .try_update(
                "sync_purchases",
                &format!("page {}", query.page),
                self.load_page(query),
            )
            .await
    }

    /// Paginator whose pages go through [`fetch_purchases`](Self::fetch_purchases)
    /// semantics: every page is cached as it arrives.
    pub fn paginator(&self, filter: PurchaseFilter, page_size: u32) -> Paginator<Purchase> {
        let repo = self.clone();
        Paginator::new(0, move |page| {
            let repo = repo.clone();
            let query = PageQuery {
                page,
                size: page_size,
                filter: filter.clone(),
            };
            async move {
                let dto = repo.load_page(&query).await?;
                Ok::<_, AppError>(dto.content.iter().map(PurchaseDto::to_entity).collect())
            }
        })
    }

    pub async fn fetch_purchase(&self, purchase_id: i64) -> Resource<PurchaseDto> {
        self.ctx
            .try_update("sync_purchase", &purchase_id.to_string(), async {
                let dto = self.ctx.call(self.api.get_purchase(purchase_id)).await?;
                self.ctx.store().upsert(&[dto.to_entity()])?;
                Ok(dto)
            })
            .await
    }

    pub async fn create_purchase(&self, request: &PurchaseCreateRequest) -> Resource<PurchaseDto> {
        self.ctx
            .try_update(
                "create_purchase",
                &request.name,
                self.ctx.call(self.api.create_purchase(request)),
            )
            .await
    }

    pub async fn resolve_purchase(&self, purchase_id: i64, approve: bool) -> Resource<PurchaseDto> {
        let status = if approve {
            PurchaseStatus::Accept
        } else {
            PurchaseStatus::Decline
        };
        self.ctx
            .try_update(
                "resolve_purchase",
                &purchase_id.to_string(),
                self.ctx.call(self.api.resolve_purchase(purchase_id, status)),
            )
            .await
    }

    /// Delete on the server, then drop the cached row.
    pub async fn delete_purchase(&self, purchase_id: i64) -> Resource<()> {
        self.ctx
            .try_update("delete_purchase", &purchase_id.to_string(), async {
                self.ctx.call(self.api.delete_purchase(purchase_id)).await?;
                self.ctx
                    .store()
                    .delete::<Purchase>(Criteria::ids([int(purchase_id)]))?;
                Ok(())
            })
            .await
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn get_purchases(&self) -> LiveQuery<Vec<Purchase>> {
        self.ctx.store().observe(&[Table::Purchases], |conn| {
            load_where::<Purchase>(conn, "1 = 1 ORDER BY purchase_date DESC", Vec::new())
        })
    }

    pub fn search_purchases(&self, query: &str) -> LiveQuery<Vec<Purchase>> {
        let pattern = like(query);
        self.ctx.store().observe(&[Table::Purchases], move |conn| {
            load_where::<Purchase>(
                conn,
                "name LIKE ?1 OR description LIKE ?1 ORDER BY purchase_date DESC",
                vec![pattern.clone()],
            )
        })
    }

    pub fn get_purchase(&self, purchase_id: i64) -> LiveQuery<Option<Purchase>> {
        self.ctx.store().observe(&[Table::Purchases], move |conn| {
            load_by_id::<Purchase>(conn, int(purchase_id))
        })
    }
}
