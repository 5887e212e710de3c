use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateQuantityRequest},
        favorites::{FavoriteDto, FavoriteList},
        orders::{CheckoutRequest, OrderList, PaymentInput, ShippingInput},
    },
    error::ErrorBody,
    models::{CartItem, Favorite, Order, OrderLine, Payment, Product, Shipping},
    response::ApiResponse,
    routes::{cart, favorites, health, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        orders::list_orders,
        orders::checkout
    ),
    components(
        schemas(
            CartItem,
            Favorite,
            Order,
            OrderLine,
            Shipping,
            Payment,
            Product,
            CartItemDto,
            CartList,
            FavoriteDto,
            FavoriteList,
            OrderList,
            AddToCartRequest,
            UpdateQuantityRequest,
            CheckoutRequest,
            ShippingInput,
            PaymentInput,
            ErrorBody,
            ApiResponse<CartList>,
            ApiResponse<CartItem>,
            ApiResponse<FavoriteList>,
            ApiResponse<Favorite>,
            ApiResponse<OrderList>,
            ApiResponse<Order>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Orders", description = "Order and checkout endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
