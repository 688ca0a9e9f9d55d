pub use super::device::Entity as Device;
pub use super::event::Entity as Event;
pub use super::l1interface::Entity as L1Interface;
pub use super::location::Entity as Location;
pub use super::mac::Entity as Mac;
pub use super::macip::Entity as MacIp;
pub use super::macport::Entity as MacPort;
pub use super::oui::Entity as Oui;
pub use super::vlan::Entity as Vlan;
pub use super::vlanport::Entity as VlanPort;
pub use super::zone::Entity as Zone;
