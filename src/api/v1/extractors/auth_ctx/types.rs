/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - access guard が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 資格情報の解析や identity の検証は middleware/services 側の責務
 */
use std::ops::Deref;

use crate::security::SecurityContext;

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone)]
pub struct AuthCtx(pub SecurityContext);

impl Deref for AuthCtx {
    type Target = SecurityContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
