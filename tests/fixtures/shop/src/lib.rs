pub mod models;
pub mod orders;

pub mod admin {
    #[request_mapping("/admin")]
    pub struct AdminController;

    impl AdminController {
        #[delete_mapping("/cache")]
        pub async fn clear(&self) {}

        pub fn helper(&self) -> bool {
            true
        }
    }
}
