use crate::models::{NewOrder, Order};
use axum::extract::Path;
use axum::Json;

#[request_mapping(path = "/orders", produces = "application/json")]
pub struct OrderController;

impl OrderController {
    #[get_mapping("/{id}")]
    pub async fn find(
        &self,
        id: Path<u64>,
        #[request_param(default_value = "false")] expand: bool,
    ) -> Json<Order> {
        todo!()
    }

    #[request_mapping(method = POST, consumes = "application/json")]
    pub async fn create(&self, #[request_body] order: Json<NewOrder>) -> Json<Order> {
        todo!()
    }

    #[request_mapping(path = ["/legacy", "/old"], method = [GET, HEAD])]
    #[deprecated]
    pub async fn legacy(&self) {}
}
