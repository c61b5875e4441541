use std::future::Future;

#[derive(Debug, Clone, Default)]
pub struct AccountContext {
    pub username: String,
    pub proxy: Option<String>,
}

tokio::task_local! {
    static CURRENT: AccountContext;
}

pub async fn with_account_context<F, T>(ctx: AccountContext, fut: F) -> T
where
    F: Future<Output = T>,
{
    CURRENT.scope(ctx, fut).await
}

pub fn try_get() -> Option<AccountContext> {
    CURRENT.try_with(|ctx| ctx.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_is_visible_only_inside_scope() {
        assert!(try_get().is_none());
        let seen = with_account_context(
            AccountContext {
                username: "pilot".to_string(),
                proxy: None,
            },
            async { try_get().map(|ctx| ctx.username) },
        )
        .await;
        assert_eq!(seen.as_deref(), Some("pilot"));
        assert!(try_get().is_none());
    }
}
