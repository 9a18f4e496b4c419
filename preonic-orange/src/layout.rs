use rustkbd::keyboard::{self, layout, Action, Key};

use crate::{
    config::{COLS, ROWS},
    switch_identifier::KeySwitchIdentifier,
};
use CustomKey::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, keyboard::Layer)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Qwerty,
    /// Mouse keys and navigation, for use as a default layer.
    Manual,
    System,
    Lower,
    Raise,
    /// On while both Lower and Raise are held, or by DIP switch 0.
    Adjust,
}

/// Keycodes handled by [`crate::Orange`] rather than the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CustomKey {
    Qwerty,
    Manual,
    System,
    Lower,
    Raise,
    Adjust,
    Backlit,
}

pub type KeyAction = Action<Layer, CustomKey>;

type Table = [[KeyAction; COLS as usize]; ROWS as usize];

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct Layout {}

impl Layout {
    const QWERTY: Table = layout! {r"
        |  `  |  1  |  2  |  3  |  4  |  5  |  6  |  7  |  8  |  9  |  0  |Bksp |
        | Tab |  Q  |  W  |  E  |  R  |  T  |  Y  |  U  |  I  |  O  |  P  |RA-W |
        | Esc |  A  |  S  |  D  |  F  |  G  |  H  |  J  |  K  |  L  |RA-P |RA-Q |
        |LSft |  Z  |  X  |  C  |  V  |  B  |  N  |  M  |  ,  |  .  |  ?  |Enter|
        |LCtl |@System|LGui|LAlt |@Lower|Space|Space|LT(Layer::Raise,Enter)|RAlt|  |  |@Manual|
    "};
    const MANUAL: Table = layout! {r"
        |     |Acl0 |Acl1 |Acl2 |     |     |     |     |     |     |     | Trn |
        | Trn |Btn1 |MsUp |Btn2 |     |     |WhLt |WhDn |WhUp |WhRt |     |     |
        | Trn |MsLt |MsDn |MsRt |     |     |Left |Down | Up  |Right|     |     |
        | Trn |     |     |     |     |     |Home |PgDn |PgUp | End |     | Trn |
        | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn |@Qwerty|
    "};
    const SYSTEM: Table = layout! {r"
        |BriUp|MVlUp|AuOn |MuOn |     |     |     |     |NLck | P/  | P*  | P=  |
        |BriDn|MVlDn|AuOff|MuOff|Reset|     |     |     | P7  | P8  | P9  | P-  |
        |MPrev|MNext|MuvIn|MuMod|     |     |     |     | P4  | P5  | P6  | P+  |
        | Trn |MPlPs|MuvDe|     |     |     |     |     | P1  | P2  | P3  |PEnt |
        | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | P,  | P0  | P.  | Trn |
    "};
    const LOWER: Table = layout! {r"
        | F1  | F2  | F3  | F4  | F5  | F6  | F7  | F8  | F9  | F10 | F11 | F12 |
        |  `  |  1  |  2  |  3  |  4  |  5  |  6  |  7  |  8  |  9  |  0  |DelFw|
        |     |     |     |  (  |  )  |  '  |  ;  |  [  |  ]  |     |     |     |
        | Trn |     |     |     |  -  |NuBs |  /  |  =  |     |     |     |     |
        | Trn | Trn | Trn | Trn | Trn |Bksp |Bksp |@Adjust| Trn | Trn | Trn | Trn |
    "};
    const RAISE: Table = layout! {r#"
        | F1  | F2  | F3  | F4  | F5  | F6  | F7  | F8  | F9  | F10 | F11 | F12 |
        |  ~  |  !  |  @  |  #  |  $  |  %  |  ^  |  &  |  *  |  (  |  )  |DelFw|
        |     |     |     |  <  |  >  |  "  |  :  |  {  |  }  |     |     |     |
        | Trn |     |     |     |  _  |Pipe |  ?  |  +  |     |     |     |     |
        | Trn | Trn | Trn | Trn |@Adjust|Bksp|Bksp | Trn | Trn | Trn | Trn | Trn |
    "#};
    const ADJUST: Table = layout! {r"
        |     |     |     |     |     |     |     |     |     |     |     |     |
        |     |     |     |     |     |     |WhLt |WhDn |WhUp |WhRt |     |     |
        |     |     |     |     |     |     |Left |Down | Up  |Right|     |     |
        | Trn |     |     |     |     |     |Home |PgDn |PgUp | End |     |     |
        | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn | Trn |
    "};
}

impl keyboard::Layout<2> for Layout {
    type Identifier = KeySwitchIdentifier;
    type Layer = Layer;
    type Custom = CustomKey;

    const ROWS: u8 = ROWS;

    fn action(&self, layer: Layer, switch: &KeySwitchIdentifier) -> KeyAction {
        let table = match layer {
            Layer::Qwerty => &Self::QWERTY,
            Layer::Manual => &Self::MANUAL,
            Layer::System => &Self::SYSTEM,
            Layer::Lower => &Self::LOWER,
            Layer::Raise => &Self::RAISE,
            Layer::Adjust => &Self::ADJUST,
        };
        table
            .get(switch.row as usize)
            .and_then(|row| row.get(switch.col as usize))
            .copied()
            .unwrap_or(Action::Key(Key::None))
    }
}
