// The curated MIB objects polled from every device.

// SNMPv2-MIB
pub(crate) const SYS_DESCR: &str = ".1.3.6.1.2.1.1.1.0";
pub(crate) const SYS_OBJECT_ID: &str = ".1.3.6.1.2.1.1.2.0";
pub(crate) const SYS_UPTIME: &str = ".1.3.6.1.2.1.1.3.0";
pub(crate) const SYS_NAME: &str = ".1.3.6.1.2.1.1.5.0";

// IF-MIB ifTable / ifXTable / ifStackTable
pub(crate) const IF_DESCR: &str = ".1.3.6.1.2.1.2.2.1.2";
pub(crate) const IF_TYPE: &str = ".1.3.6.1.2.1.2.2.1.3";
pub(crate) const IF_SPEED: &str = ".1.3.6.1.2.1.2.2.1.5";
pub(crate) const IF_ADMIN_STATUS: &str = ".1.3.6.1.2.1.2.2.1.7";
pub(crate) const IF_OPER_STATUS: &str = ".1.3.6.1.2.1.2.2.1.8";
pub(crate) const IF_NAME: &str = ".1.3.6.1.2.1.31.1.1.1.1";
pub(crate) const IF_HIGH_SPEED: &str = ".1.3.6.1.2.1.31.1.1.1.15";
pub(crate) const IF_ALIAS: &str = ".1.3.6.1.2.1.31.1.1.1.18";
pub(crate) const IF_STACK_STATUS: &str = ".1.3.6.1.2.1.31.1.2.1.3";

// EtherLike-MIB
pub(crate) const DOT3_STATS_DUPLEX_STATUS: &str = ".1.3.6.1.2.1.10.7.2.1.19";

// BRIDGE-MIB / Q-BRIDGE-MIB
pub(crate) const DOT1D_BASE_PORT_IFINDEX: &str = ".1.3.6.1.2.1.17.1.4.1.2";
pub(crate) const DOT1D_TP_FDB_PORT: &str = ".1.3.6.1.2.1.17.4.3.1.2";
pub(crate) const DOT1Q_TP_FDB_PORT: &str = ".1.3.6.1.2.1.17.7.1.2.2.1.2";
pub(crate) const DOT1Q_VLAN_STATIC_NAME: &str = ".1.3.6.1.2.1.17.7.1.4.3.1.1";
pub(crate) const DOT1Q_PVID: &str = ".1.3.6.1.2.1.17.7.1.4.5.1.1";

// IP-MIB
pub(crate) const IP_NET_TO_MEDIA_PHYS_ADDRESS: &str = ".1.3.6.1.2.1.4.22.1.2";
pub(crate) const IP_NET_TO_PHYSICAL_PHYS_ADDRESS: &str = ".1.3.6.1.2.1.4.35.1.2";

// LLDP-MIB
pub(crate) const LLDP_REM_CHASSIS_ID: &str = ".1.0.8802.1.1.2.1.4.1.1.5";
pub(crate) const LLDP_REM_PORT_DESC: &str = ".1.0.8802.1.1.2.1.4.1.1.8";
pub(crate) const LLDP_REM_SYS_NAME: &str = ".1.0.8802.1.1.2.1.4.1.1.9";
pub(crate) const LLDP_REM_SYS_DESC: &str = ".1.0.8802.1.1.2.1.4.1.1.10";

// CISCO-CDP-MIB
pub(crate) const CDP_CACHE_DEVICE_ID: &str = ".1.3.6.1.4.1.9.9.23.1.2.1.1.6";
pub(crate) const CDP_CACHE_DEVICE_PORT: &str = ".1.3.6.1.4.1.9.9.23.1.2.1.1.7";
pub(crate) const CDP_CACHE_PLATFORM: &str = ".1.3.6.1.4.1.9.9.23.1.2.1.1.8";

// CISCO-VTP-MIB
pub(crate) const VTP_VLAN_STATE: &str = ".1.3.6.1.4.1.9.9.46.1.3.1.1.2";
pub(crate) const VTP_VLAN_NAME: &str = ".1.3.6.1.4.1.9.9.46.1.3.1.1.4";
pub(crate) const VLAN_TRUNK_PORT_VLANS_ENABLED: &str = ".1.3.6.1.4.1.9.9.46.1.6.1.1.4";
pub(crate) const VLAN_TRUNK_PORT_NATIVE_VLAN: &str = ".1.3.6.1.4.1.9.9.46.1.6.1.1.5";
pub(crate) const VLAN_TRUNK_PORT_DYNAMIC_STATUS: &str = ".1.3.6.1.4.1.9.9.46.1.6.1.1.14";

// CISCO-VLAN-MEMBERSHIP-MIB
pub(crate) const VM_VLAN: &str = ".1.3.6.1.4.1.9.9.68.1.2.2.1.2";

// CISCO-VLAN-IFTABLE-RELATIONSHIP-MIB
pub(crate) const CVI_ROUTED_VLAN_IFINDEX: &str = ".1.3.6.1.4.1.9.9.128.1.1.1.1.3";

// CISCO-STACK-MIB
pub(crate) const PORT_DUPLEX: &str = ".1.3.6.1.4.1.9.5.1.4.1.1.10";
pub(crate) const PORT_IFINDEX: &str = ".1.3.6.1.4.1.9.5.1.4.1.1.11";

// CISCO-C2900-MIB
pub(crate) const C2900_PORT_LINKBEAT_STATUS: &str = ".1.3.6.1.4.1.9.9.87.1.4.1.1.18";
pub(crate) const C2900_PORT_IFINDEX: &str = ".1.3.6.1.4.1.9.9.87.1.4.1.1.25";
pub(crate) const C2900_PORT_DUPLEX_STATE: &str = ".1.3.6.1.4.1.9.9.87.1.4.1.1.31";
pub(crate) const C2900_PORT_DUPLEX_STATUS: &str = ".1.3.6.1.4.1.9.9.87.1.4.1.1.32";

// CISCO-ESSWITCH-MIB, indexed by ifIndex
pub(crate) const SW_PORT_DUPLEX_STATUS: &str = ".1.3.6.1.4.1.437.1.1.3.3.1.1.8";

// JUNIPER-VLAN-MIB
pub(crate) const JNX_EX_VLAN_TAG: &str = ".1.3.6.1.4.1.2636.3.40.1.5.1.5.1.5";
pub(crate) const JNX_EX_VLAN_PORT_STATUS: &str = ".1.3.6.1.4.1.2636.3.40.1.5.1.7.1.3";
pub(crate) const JNX_EX_VLAN_PORT_ACCESS_MODE: &str = ".1.3.6.1.4.1.2636.3.40.1.5.1.7.1.5";

/// ifType value for ethernetCsmacd.
pub(crate) const IFTYPE_ETHERNET_CSMACD: i64 = 6;
