//! Step definitions for the notification acceptance scenarios.
//!
//! Each binding maps one phrase of the scenario vocabulary to a single
//! world method; all real work happens in the helper clients.

use cucumber::{given, then, when};

use crate::world::NotificationWorld;

#[given(expr = "{string} is installed correctly")]
async fn storage_is_installed_correctly(world: &mut NotificationWorld, sink: String) {
    world.storage_installed(sink).await;
}

#[given(expr = "cygnus is installed with type {string}")]
async fn cygnus_is_installed_with_type(world: &mut NotificationWorld, mode: String) {
    world.connector_installed(&mode).await;
}

#[given(
    expr = "a tenant {string}, service path {string}, resource {string}, \
            with attribute number {string}, attribute name {string} and \
            attribute type {string}"
)]
fn a_tenant_with_storage_schema(
    world: &mut NotificationWorld,
    tenant: String,
    service_path: String,
    resource: String,
    attribute_number: String,
    attribute_name: String,
    attribute_type: String,
) {
    world.configure_schema(
        tenant,
        &service_path,
        &resource,
        &attribute_number,
        &attribute_name,
        &attribute_type,
    );
}

#[given(expr = "changes new destination {string} where to verify in dataset {string}")]
fn changes_new_destination(world: &mut NotificationWorld, destination: String, dataset: String) {
    world.change_destination(&destination, &dataset);
}

#[when(
    expr = "receives a notification with attributes value {string}, \
            metadata value {string} and content {string}"
)]
async fn receives_a_notification(
    world: &mut NotificationWorld,
    attribute_value: String,
    metadata_value: String,
    content: String,
) {
    world
        .send_notification(&attribute_value, &metadata_value, &content)
        .await;
}

#[then(expr = "I receive an {string} http code")]
fn i_receive_an_http_code(world: &mut NotificationWorld, expected: String) {
    world.check_http_code(&expected);
}

#[then("Validate that the attribute value and type are stored in hadoop")]
async fn validate_values_and_type_stored(world: &mut NotificationWorld) {
    world.verify_stored_values_and_type().await;
}

#[then("Validate that the attribute metadatas are stored in hadoop")]
async fn validate_metadatas_stored(world: &mut NotificationWorld) {
    world.verify_stored_metadata().await;
}

#[then("delete the file created in hadoop")]
async fn delete_the_file_created(world: &mut NotificationWorld) {
    world.delete_tenant_directory().await;
}
