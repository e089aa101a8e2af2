pub mod amqp;
pub mod mailgun;
pub mod null;
pub mod ses;
pub mod sqs;

use aws_config::{
    BehaviorVersion, SdkConfig,
    meta::region::RegionProviderChain,
};
use aws_sdk_sesv2::config::{Credentials, Region};

/// Loads the shared AWS configuration, preferring explicit region and keys
/// over the default provider chain.
pub(crate) async fn load_aws_config(
    region: Option<&str>,
    access_key_id: Option<&str>,
    secret_access_key: Option<&str>,
    provider_name: &'static str,
) -> SdkConfig {
    let region_provider =
        RegionProviderChain::first_try(region.map(|r| Region::new(r.to_string())))
            .or_default_provider();

    let mut builder = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    if let (Some(access_key), Some(secret_key)) = (access_key_id, secret_access_key) {
        let credentials = Credentials::new(access_key, secret_key, None, None, provider_name);
        builder = builder.credentials_provider(credentials);
    }

    builder.load().await
}
