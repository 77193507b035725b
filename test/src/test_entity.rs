use tandem_shared::{
    exceeds_epsilon, BitReader, BitWrite, ReadPolicy, Replicated, ReplicatedFields, Serde,
    SerdeErr, SyncList, SyncVar, VarConfig, WritePolicy,
};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Serde for Position {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Position {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.x.bit_length() + self.y.bit_length()
    }
}

/// An entity with a mix of field kinds and policies
pub struct PlayerState {
    pub position: SyncVar<Position>,
    pub health: SyncVar<f32>,
    pub inventory: SyncList<u16>,
    /// Only the owning client may see this
    pub secret: SyncVar<u32>,
    /// Written by the owning client, relayed by the authority
    pub emotes: SyncList<String>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            position: SyncVar::new(Position::default(), VarConfig::default()),
            health: SyncVar::new(100.0, VarConfig::default()).with_threshold(exceeds_epsilon(0.5)),
            inventory: SyncList::new(VarConfig::default()),
            secret: SyncVar::new(
                0,
                VarConfig::default().with_read_policy(ReadPolicy::OwnerOnly),
            ),
            emotes: SyncList::new(VarConfig::default().with_write_policy(WritePolicy::OwnerOnly)),
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicatedFields for PlayerState {
    fn fields(&self) -> Vec<&dyn Replicated> {
        vec![
            &self.position as &dyn Replicated,
            &self.health,
            &self.inventory,
            &self.secret,
            &self.emotes,
        ]
    }

    fn fields_mut(&mut self) -> Vec<&mut dyn Replicated> {
        vec![
            &mut self.position as &mut dyn Replicated,
            &mut self.health,
            &mut self.inventory,
            &mut self.secret,
            &mut self.emotes,
        ]
    }
}
