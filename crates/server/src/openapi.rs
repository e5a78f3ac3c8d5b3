use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct StoreDoc { pub name: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BillboardDoc { pub label: String, pub image_url: String, pub is_banner: Option<bool> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CategoryDoc {
    pub name: String,
    pub slug: Option<String>,
    pub parent_id: Option<Uuid>,
    pub billboard_id: Option<Uuid>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SubcategoryDoc {
    pub name: String,
    pub slug: Option<String>,
    pub category_id: Uuid,
    pub billboard_id: Option<Uuid>,
}

/// Colors and sizes share one shape.
#[derive(ToSchema)]
pub struct NameValueDoc { pub name: String, pub value: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct VariantDoc {
    /// `colorId` or `sizeId`
    pub id: Uuid,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductDoc {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    /// At least one url
    pub images: Vec<String>,
    pub colors: Option<Vec<VariantDoc>>,
    pub sizes: Option<Vec<VariantDoc>>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OfferingDoc {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewsDoc {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OrderItemDoc { pub product_id: Uuid, pub quantity: i32 }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OrderDoc {
    pub username: String,
    pub phone: String,
    pub address: String,
    pub is_paid: Option<bool>,
    pub items: Vec<OrderItemDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct OrderPatchDoc {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// pending, paid, shipped, delivered or cancelled
    pub status: Option<String>,
    pub is_paid: Option<bool>,
    /// Replaces every line when present
    pub items: Option<Vec<OrderItemDoc>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::auth::register,
        crate::auth::login,
        crate::auth::logout,
        crate::auth::me,
        crate::routes::stores::list,
        crate::routes::stores::create,
        crate::routes::stores::get,
        crate::routes::stores::update,
        crate::routes::stores::delete,
        crate::routes::billboards::list,
        crate::routes::billboards::get,
        crate::routes::billboards::create,
        crate::routes::billboards::update,
        crate::routes::billboards::delete,
        crate::routes::categories::list,
        crate::routes::categories::tree,
        crate::routes::categories::get,
        crate::routes::categories::create,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::subcategories::list,
        crate::routes::subcategories::get,
        crate::routes::subcategories::create,
        crate::routes::subcategories::update,
        crate::routes::subcategories::delete,
        crate::routes::colors::list,
        crate::routes::colors::get,
        crate::routes::colors::create,
        crate::routes::colors::update,
        crate::routes::colors::delete,
        crate::routes::sizes::list,
        crate::routes::sizes::get,
        crate::routes::sizes::create,
        crate::routes::sizes::update,
        crate::routes::sizes::delete,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::offerings::list,
        crate::routes::offerings::get,
        crate::routes::offerings::create,
        crate::routes::offerings::update,
        crate::routes::offerings::delete,
        crate::routes::news::list,
        crate::routes::news::get,
        crate::routes::news::create,
        crate::routes::news::update,
        crate::routes::news::delete,
        crate::routes::orders::list,
        crate::routes::orders::get,
        crate::routes::orders::create,
        crate::routes::orders::checkout,
        crate::routes::orders::update,
        crate::routes::orders::delete,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            StoreDoc,
            BillboardDoc,
            CategoryDoc,
            SubcategoryDoc,
            NameValueDoc,
            VariantDoc,
            ProductDoc,
            OfferingDoc,
            NewsDoc,
            OrderItemDoc,
            OrderDoc,
            OrderPatchDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "stores"),
        (name = "billboards"),
        (name = "categories"),
        (name = "subcategories"),
        (name = "colors"),
        (name = "sizes"),
        (name = "products"),
        (name = "services"),
        (name = "news"),
        (name = "orders")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_store_scoped_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/{store_id}/products"));
        assert!(paths.contains_key("/api/{store_id}/categories/tree"));
        assert!(paths.contains_key("/api/{store_id}/checkout"));
        assert!(paths.contains_key("/auth/login"));
    }
}
