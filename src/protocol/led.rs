use bitfield::bitfield;
use serde::Serialize;

// The four LED status bytes packed little-endian into one word.
bitfield! {
    struct LedBits(u32);
    impl Debug;
    heater1, _: 0;
    valve3, _: 1;
    check_system, _: 2;
    pool, _: 3;
    spa, _: 4;
    filter, _: 5;
    lights, _: 6;
    aux1, _: 7;
    aux2, _: 8;
    service, _: 9;
    aux3, _: 10;
    aux4, _: 11;
    aux5, _: 12;
    aux6, _: 13;
    valve4_heater2, _: 14;
    spillover, _: 15;
    system_off, _: 16;
    aux7, _: 17;
    aux8, _: 18;
    aux9, _: 19;
    aux10, _: 20;
    aux11, _: 21;
    aux12, _: 22;
    aux13, _: 23;
    aux14, _: 24;
    super_chlorinate, _: 25;
}

/// Named indicator lamps from an UpdateLED frame.
///
/// Field names serialize to the same keys the controller's panel labels use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedStatus {
    pub heater1: bool,
    pub valve3: bool,
    pub check_system: bool,
    pub pool: bool,
    pub spa: bool,
    pub filter: bool,
    pub lights: bool,
    pub aux1: bool,
    pub aux2: bool,
    pub service: bool,
    pub aux3: bool,
    pub aux4: bool,
    pub aux5: bool,
    pub aux6: bool,
    #[serde(rename = "Valve4_Heater2")]
    pub valve4_heater2: bool,
    pub spillover: bool,
    pub system_off: bool,
    pub aux7: bool,
    pub aux8: bool,
    pub aux9: bool,
    pub aux10: bool,
    pub aux11: bool,
    pub aux12: bool,
    pub aux13: bool,
    pub aux14: bool,
    pub super_chlorinate: bool,
}

impl LedStatus {
    /// Decodes a full UpdateLED frame; the four status bytes sit at
    /// offsets 4..8. Returns None for frames too short to carry them.
    pub fn decode(frame: &[u8]) -> Option<Self> {
        if frame.len() < 12 {
            return None;
        }
        let bits = LedBits(u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]));
        Some(Self {
            heater1: bits.heater1(),
            valve3: bits.valve3(),
            check_system: bits.check_system(),
            pool: bits.pool(),
            spa: bits.spa(),
            filter: bits.filter(),
            lights: bits.lights(),
            aux1: bits.aux1(),
            aux2: bits.aux2(),
            service: bits.service(),
            aux3: bits.aux3(),
            aux4: bits.aux4(),
            aux5: bits.aux5(),
            aux6: bits.aux6(),
            valve4_heater2: bits.valve4_heater2(),
            spillover: bits.spillover(),
            system_off: bits.system_off(),
            aux7: bits.aux7(),
            aux8: bits.aux8(),
            aux9: bits.aux9(),
            aux10: bits.aux10(),
            aux11: bits.aux11(),
            aux12: bits.aux12(),
            aux13: bits.aux13(),
            aux14: bits.aux14(),
            super_chlorinate: bits.super_chlorinate(),
        })
    }
}
