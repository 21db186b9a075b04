/// Generates `get_<entity>` and `create_<entity>` on a client that wraps a
/// `ResourceClient` in a field named `inner`.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        paste::paste! {
            #[allow(dead_code)]
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $crate::clients::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err($crate::clients::StoreError::from)
                }

                #[tracing::instrument(skip(self, params))]
                pub async fn [<create_ $entity_name_snake>](
                    &self,
                    params: <$entity as $crate::actor_framework::Entity>::CreateParams,
                ) -> Result<$entity, $crate::clients::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner.create(params).await.map_err($crate::clients::StoreError::from)
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $entity_name_snake);
    };
}
